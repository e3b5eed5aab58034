//! Shared UDP socket setup, grounded on `VideoUDPShared.c`.

use std::net::SocketAddrV4;
use std::os::raw::c_int;

use crate::error::Error;

fn socket_io(syscall: &'static str, err: std::io::Error) -> Error {
    Error::SocketIO { syscall, source: err }
}

/// Creates and binds an `AF_INET`/`SOCK_DGRAM` socket with `SO_REUSEADDR`
/// and blocking I/O, matching `VideoUDPSharedCreateSocket`.
pub fn create_bound_socket(local: SocketAddrV4) -> Result<c_int, Error> {
    unsafe {
        let fd = libc::socket(libc::AF_INET, libc::SOCK_DGRAM, 0);
        if fd < 0 {
            return Err(socket_io("socket", std::io::Error::last_os_error()));
        }

        let reuse: c_int = 1;
        let ret = libc::setsockopt(
            fd,
            libc::SOL_SOCKET,
            libc::SO_REUSEADDR,
            &reuse as *const _ as *const libc::c_void,
            std::mem::size_of::<c_int>() as libc::socklen_t,
        );
        if ret < 0 {
            let err = std::io::Error::last_os_error();
            libc::close(fd);
            return Err(socket_io("setsockopt(SO_REUSEADDR)", err));
        }

        let flags = libc::fcntl(fd, libc::F_GETFL, 0);
        if flags < 0 {
            let err = std::io::Error::last_os_error();
            libc::close(fd);
            return Err(socket_io("fcntl(F_GETFL)", err));
        }
        let ret = libc::fcntl(fd, libc::F_SETFL, flags & !libc::O_NONBLOCK);
        if ret < 0 {
            let err = std::io::Error::last_os_error();
            libc::close(fd);
            return Err(socket_io("fcntl(F_SETFL)", err));
        }

        let sockaddr = sockaddr_in_from(local);
        let ret = libc::bind(
            fd,
            &sockaddr as *const _ as *const libc::sockaddr,
            std::mem::size_of::<libc::sockaddr_in>() as libc::socklen_t,
        );
        if ret < 0 {
            let err = std::io::Error::last_os_error();
            libc::close(fd);
            return Err(socket_io("bind", err));
        }

        Ok(fd)
    }
}

pub fn sockaddr_in_from(addr: SocketAddrV4) -> libc::sockaddr_in {
    libc::sockaddr_in {
        sin_family: libc::AF_INET as libc::sa_family_t,
        sin_port: addr.port().to_be(),
        sin_addr: libc::in_addr {
            s_addr: u32::from_ne_bytes(addr.ip().octets()),
        },
        sin_zero: [0; 8],
    }
}
