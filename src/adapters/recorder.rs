//! Matroska recorder adapter (component H): muxes MJPEG frames straight
//! through, no re-encoding. Grounded on `VideoRecorder.c`'s libav usage,
//! ported onto `ffmpeg-next`'s safe wrappers.

use ffmpeg_next as ffmpeg;

use crate::error::Error;

pub trait FrameRecorder {
    fn record(&mut self, u_timestamp: u64, jpeg: &[u8]) -> Result<(), Error>;
}

/// Rebases a wall-clock-shifted capture timestamp onto the stream's PTS
/// clock, anchoring the first recorded frame at PTS zero the way
/// `VideoRecorderRecordFrame` anchors on `uTimestampZero`.
pub fn rebase_pts(u_timestamp: u64, u_timestamp_zero: u64, time_base: (i32, i32)) -> i64 {
    let elapsed_us = u_timestamp.saturating_sub(u_timestamp_zero) as i64;
    // av_rescale_q(elapsed, {1, 1_000_000}, time_base), rounded to nearest
    // (AV_ROUND_NEAR_INF) rather than truncated: at 1/30 two frames ~33333us
    // apart must land on different PTS values.
    let num = 1_000_000 * time_base.0 as i64;
    let den = time_base.1 as i64;
    (elapsed_us * den + num / 2) / num
}

pub struct MatroskaRecorder {
    output: ffmpeg::format::context::Output,
    stream_index: usize,
    time_base: (i32, i32),
    u_timestamp_zero: Option<u64>,
}

impl MatroskaRecorder {
    pub fn create(
        path: &str,
        width: u32,
        height: u32,
        timebase_numerator: u32,
        timebase_denominator: u32,
    ) -> Result<Self, Error> {
        ffmpeg::init().map_err(|e| Error::Record(e.to_string()))?;

        let mut output = ffmpeg::format::output_as(path, "matroska")
            .map_err(|e| Error::Record(e.to_string()))?;

        let codec = ffmpeg::encoder::find(ffmpeg::codec::Id::MJPEG)
            .ok_or_else(|| Error::Record("encoder for MJPEG not found".to_string()))?;

        let mut stream = output
            .add_stream(codec)
            .map_err(|e| Error::Record(e.to_string()))?;
        let stream_index = stream.index();

        let time_base = ffmpeg::Rational::new(timebase_numerator as i32, timebase_denominator as i32);
        stream.set_time_base(time_base);

        unsafe {
            let params = &mut *stream.parameters().as_mut_ptr();
            params.codec_id = ffmpeg::codec::Id::MJPEG.into();
            params.codec_type = ffmpeg::media::Type::Video.into();
            params.width = width as i32;
            params.height = height as i32;
            params.format = ffmpeg::format::Pixel::YUVJ420P.into();
        }

        output
            .write_header()
            .map_err(|e| Error::Record(e.to_string()))?;

        Ok(MatroskaRecorder {
            output,
            stream_index,
            time_base: (timebase_numerator as i32, timebase_denominator as i32),
            u_timestamp_zero: None,
        })
    }
}

impl FrameRecorder for MatroskaRecorder {
    fn record(&mut self, u_timestamp: u64, jpeg: &[u8]) -> Result<(), Error> {
        let zero = *self.u_timestamp_zero.get_or_insert(u_timestamp);
        let pts = rebase_pts(u_timestamp, zero, self.time_base);

        let mut packet = ffmpeg::Packet::copy(jpeg);
        packet.set_stream(self.stream_index);
        packet.set_pts(Some(pts));
        packet.set_dts(Some(pts));

        packet
            .write_interleaved(&mut self.output)
            .map_err(|e| Error::Record(e.to_string()))
    }
}

impl Drop for MatroskaRecorder {
    fn drop(&mut self) {
        if let Err(e) = self.output.write_trailer() {
            log::warn!("recorder: failed to write matroska trailer: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_frame_anchors_at_pts_zero() {
        let pts = rebase_pts(5_000_000, 5_000_000, (1, 30));
        assert_eq!(pts, 0);
    }

    #[test]
    fn one_second_elapsed_yields_timebase_denominator_pts() {
        // time_base = 1/30 means one tick per 1/30s; one elapsed second is
        // 30 ticks.
        let pts = rebase_pts(6_000_000, 5_000_000, (1, 30));
        assert_eq!(pts, 30);
    }

    #[test]
    fn consecutive_frames_at_thirty_fps_get_distinct_rounded_pts() {
        let first = rebase_pts(1_000_000, 1_000_000, (1, 30));
        let second = rebase_pts(1_033_333, 1_000_000, (1, 30));
        assert_eq!(first, 0);
        assert_eq!(second, 1);
        assert!(second > first);
    }
}
