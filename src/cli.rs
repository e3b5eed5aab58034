//! Command line grammar: `fastmjpg <input> <output>...`. Parsing and usage
//! text live outside the pipeline's own scope, but a real binary needs
//! something driving it; this mirrors `FastMJPG.c`'s `parseParams`/
//! `validateParams` without its `MAX_PARAMS`-sized static arrays.

use std::net::SocketAddrV4;

use crate::error::Error;

pub enum InputSpec {
    Capture {
        device_name: String,
        width: u32,
        height: u32,
        timebase_numerator: u32,
        timebase_denominator: u32,
    },
    Receive {
        local: SocketAddrV4,
        max_packet_length: u32,
        max_jpeg_length: u32,
        width: u32,
        height: u32,
        timebase_numerator: u32,
        timebase_denominator: u32,
    },
}

pub enum OutputSpec {
    Render { window_width: u32, window_height: u32 },
    Record { file_name: String },
    Send {
        local: SocketAddrV4,
        remote: SocketAddrV4,
        max_packet_length: u32,
        max_jpeg_length: u32,
        send_rounds: u32,
    },
    Pipe {
        fd: i32,
        rgb: bool,
        max_packet_length: u32,
    },
}

pub struct Pipeline {
    pub input: InputSpec,
    pub outputs: Vec<OutputSpec>,
}

pub const USAGE: &str = "\
fastmjpg <input> <output 0> <output 1> ... <output n>

input:
    capture DEVICE_NAME RESOLUTION_WIDTH RESOLUTION_HEIGHT TIMEBASE_NUMERATOR TIMEBASE_DENOMINATOR
    receive LOCAL_IP_ADDRESS LOCAL_PORT MAX_PACKET_LENGTH MAX_JPEG_LENGTH RESOLUTION_WIDTH RESOLUTION_HEIGHT TIMEBASE_NUMERATOR TIMEBASE_DENOMINATOR

output:
    render WINDOW_WIDTH WINDOW_HEIGHT
    record FILE_NAME
    send LOCAL_IP_ADDRESS LOCAL_PORT REMOTE_IP_ADDRESS REMOTE_PORT MAX_PACKET_LENGTH MAX_JPEG_LENGTH SEND_ROUNDS
    pipe PIPE_FILE_DESCRIPTOR RGB_OR_JPEG MAX_PACKET_LENGTH
";

fn need(args: &[String], from: usize, count: usize, what: &str) -> Result<(), Error> {
    if args.len() < from + count {
        return Err(Error::InvalidArgs(format!("not enough arguments for {}", what)));
    }
    Ok(())
}

fn parse_u32(args: &[String], index: usize, field: &str) -> Result<u32, Error> {
    args[index]
        .parse::<u32>()
        .map_err(|_| Error::InvalidArgs(format!("{} must be an unsigned integer", field)))
}

fn parse_addr(ip: &str, port: u32, field: &str) -> Result<SocketAddrV4, Error> {
    let ip = ip
        .parse()
        .map_err(|_| Error::InvalidArgs(format!("{} is not a valid IPv4 address", field)))?;
    let port = u16::try_from(port)
        .map_err(|_| Error::InvalidArgs(format!("{} port out of range", field)))?;
    Ok(SocketAddrV4::new(ip, port))
}

pub fn parse(args: &[String]) -> Result<Pipeline, Error> {
    if args.is_empty() {
        return Err(Error::InvalidArgs("no input given".to_string()));
    }

    let mut pos = 0;
    let input = match args[pos].as_str() {
        "capture" => {
            need(args, pos, 6, "capture")?;
            let input = InputSpec::Capture {
                device_name: args[pos + 1].clone(),
                width: parse_u32(args, pos + 2, "resolution width")?,
                height: parse_u32(args, pos + 3, "resolution height")?,
                timebase_numerator: parse_u32(args, pos + 4, "timebase numerator")?,
                timebase_denominator: parse_u32(args, pos + 5, "timebase denominator")?,
            };
            pos += 6;
            input
        }
        "receive" => {
            need(args, pos, 9, "receive")?;
            let local = parse_addr(&args[pos + 1], parse_u32(args, pos + 2, "local port")?, "local address")?;
            let input = InputSpec::Receive {
                local,
                max_packet_length: parse_u32(args, pos + 3, "max packet length")?,
                max_jpeg_length: parse_u32(args, pos + 4, "max jpeg length")?,
                width: parse_u32(args, pos + 5, "resolution width")?,
                height: parse_u32(args, pos + 6, "resolution height")?,
                timebase_numerator: parse_u32(args, pos + 7, "timebase numerator")?,
                timebase_denominator: parse_u32(args, pos + 8, "timebase denominator")?,
            };
            pos += 9;
            input
        }
        other => {
            return Err(Error::InvalidArgs(format!(
                "first argument must be capture or receive, got {}",
                other
            )))
        }
    };

    let mut outputs = Vec::new();
    let mut render_count = 0;
    while pos < args.len() {
        match args[pos].as_str() {
            "capture" | "receive" => {
                return Err(Error::InvalidArgs(
                    "capture/receive may only appear as the first argument".to_string(),
                ))
            }
            "render" => {
                need(args, pos, 3, "render")?;
                outputs.push(OutputSpec::Render {
                    window_width: parse_u32(args, pos + 1, "window width")?,
                    window_height: parse_u32(args, pos + 2, "window height")?,
                });
                render_count += 1;
                pos += 3;
            }
            "record" => {
                need(args, pos, 2, "record")?;
                outputs.push(OutputSpec::Record {
                    file_name: args[pos + 1].clone(),
                });
                pos += 2;
            }
            "send" => {
                need(args, pos, 8, "send")?;
                let local = parse_addr(&args[pos + 1], parse_u32(args, pos + 2, "local port")?, "local address")?;
                let remote = parse_addr(&args[pos + 3], parse_u32(args, pos + 4, "remote port")?, "remote address")?;
                outputs.push(OutputSpec::Send {
                    local,
                    remote,
                    max_packet_length: parse_u32(args, pos + 5, "max packet length")?,
                    max_jpeg_length: parse_u32(args, pos + 6, "max jpeg length")?,
                    send_rounds: parse_u32(args, pos + 7, "send rounds")?,
                });
                pos += 8;
            }
            "pipe" => {
                need(args, pos, 4, "pipe")?;
                let fd = args[pos + 1]
                    .parse::<i32>()
                    .map_err(|_| Error::InvalidArgs("pipe file descriptor must be an integer".to_string()))?;
                let rgb = args[pos + 2] == "rgb";
                let max_packet_length = parse_u32(args, pos + 3, "max packet length")?;
                if max_packet_length == 0 {
                    return Err(Error::InvalidArgs(
                        "pipe max packet length must be non-zero".to_string(),
                    ));
                }
                outputs.push(OutputSpec::Pipe { fd, rgb, max_packet_length });
                pos += 4;
            }
            other => {
                return Err(Error::InvalidArgs(format!("unexpected argument: {}", other)))
            }
        }
    }

    if outputs.is_empty() {
        return Err(Error::InvalidArgs("at least one output is required".to_string()));
    }
    if render_count > 1 {
        return Err(Error::InvalidArgs("there can be at most one render output".to_string()));
    }

    Ok(Pipeline { input, outputs })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(s: &str) -> Vec<String> {
        s.split_whitespace().map(String::from).collect()
    }

    #[test]
    fn parses_capture_with_a_send_output() {
        let pipeline = parse(&args(
            "capture /dev/video0 1280 720 1 30 send 127.0.0.1 5000 127.0.0.1 6000 1400 65536 1",
        ))
        .unwrap();
        assert!(matches!(pipeline.input, InputSpec::Capture { .. }));
        assert_eq!(pipeline.outputs.len(), 1);
    }

    #[test]
    fn rejects_second_capture() {
        let err = parse(&args(
            "capture /dev/video0 1280 720 1 30 capture /dev/video1 1280 720 1 30",
        ))
        .unwrap_err();
        assert!(matches!(err, Error::InvalidArgs(_)));
    }

    #[test]
    fn rejects_two_renders() {
        let err = parse(&args(
            "capture /dev/video0 1280 720 1 30 render 640 480 render 640 480",
        ))
        .unwrap_err();
        assert!(matches!(err, Error::InvalidArgs(_)));
    }

    #[test]
    fn rejects_zero_pipe_packet_length() {
        let err = parse(&args("capture /dev/video0 1280 720 1 30 pipe 3 jpeg 0")).unwrap_err();
        assert!(matches!(err, Error::InvalidArgs(_)));
    }

    #[test]
    fn rejects_missing_output() {
        let err = parse(&args("capture /dev/video0 1280 720 1 30")).unwrap_err();
        assert!(matches!(err, Error::InvalidArgs(_)));
    }
}
