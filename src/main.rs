mod adapters;
mod cli;
mod envelope;
mod error;
mod pipe;
mod scheduler;
mod sinks;
mod udp;
mod v4l2;
mod wire;

use std::os::raw::c_int;
use std::process::ExitCode;

use cli::{InputSpec, OutputSpec};
use error::Error;
use scheduler::{Scheduler, Source};
use sinks::SinkStage;

fn main() -> ExitCode {
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &[String]) -> Result<(), Error> {
    if args.is_empty() || matches!(args[0].as_str(), "help" | "--help" | "-h") {
        print!("{}", cli::USAGE);
        return Ok(());
    }

    let pipeline = cli::parse(args)?;

    let (source, source_width, source_height, timebase_numerator, timebase_denominator, receiver_fd) =
        match pipeline.input {
            InputSpec::Capture {
                device_name,
                width,
                height,
                timebase_numerator,
                timebase_denominator,
            } => {
                log::info!("opening capture device {}", device_name);
                let device = v4l2::CaptureDevice::open(
                    &device_name,
                    width,
                    height,
                    timebase_numerator,
                    timebase_denominator,
                )?;
                (
                    Source::Capture(device),
                    width,
                    height,
                    timebase_numerator,
                    timebase_denominator,
                    None,
                )
            }
            InputSpec::Receive {
                local,
                max_packet_length,
                max_jpeg_length,
                width,
                height,
                timebase_numerator,
                timebase_denominator,
            } => {
                log::info!("listening for UDP frames on {}", local);
                let receiver = udp::UdpReceiver::new(max_packet_length, max_jpeg_length, local)?;
                let fd = receiver.fd();
                (
                    Source::Receive(receiver),
                    width,
                    height,
                    timebase_numerator,
                    timebase_denominator,
                    Some(fd),
                )
            }
        };

    let needs_rgb = pipeline.outputs.iter().any(|o| {
        matches!(
            o,
            OutputSpec::Render { .. } | OutputSpec::Pipe { rgb: true, .. }
        )
    });

    let decoder: Option<Box<dyn adapters::JpegDecoder>> = if needs_rgb {
        log::info!("constructing jpeg decoder for {}x{}", source_width, source_height);
        Some(Box::new(adapters::TurboJpegDecoder::new(
            source_width,
            source_height,
        )?))
    } else {
        None
    };

    let mut sinks = Vec::with_capacity(pipeline.outputs.len());
    for output in pipeline.outputs {
        sinks.push(build_sink(
            output,
            source_width,
            source_height,
            timebase_numerator,
            timebase_denominator,
        )?);
    }

    scheduler::install_sigint_handler(receiver_fd)?;

    let mut scheduler = Scheduler::new(source, sinks, decoder);
    scheduler.run()
}

fn build_sink(
    output: OutputSpec,
    source_width: u32,
    source_height: u32,
    timebase_numerator: u32,
    timebase_denominator: u32,
) -> Result<SinkStage, Error> {
    match output {
        OutputSpec::Render { window_width, window_height } => {
            let renderer = adapters::GliumRenderer::create(
                source_width,
                source_height,
                window_width,
                window_height,
                "fastmjpg",
            )?;
            Ok(SinkStage::Render(Box::new(renderer)))
        }
        OutputSpec::Record { file_name } => {
            let recorder = adapters::MatroskaRecorder::create(
                &file_name,
                source_width,
                source_height,
                timebase_numerator,
                timebase_denominator,
            )?;
            Ok(SinkStage::Record(Box::new(recorder)))
        }
        OutputSpec::Send {
            local,
            remote,
            max_packet_length,
            max_jpeg_length,
            send_rounds,
        } => {
            let sender = udp::UdpSender::new(max_packet_length, max_jpeg_length, local, remote)?;
            Ok(SinkStage::Send { sender, send_rounds })
        }
        OutputSpec::Pipe { fd, rgb, max_packet_length } => {
            let writer = pipe::PipeWriter::new(fd as c_int, max_packet_length);
            Ok(SinkStage::Pipe { writer, rgb })
        }
    }
}

