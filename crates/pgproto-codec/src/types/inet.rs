//! `INET` and `CIDR` network addresses.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use bytes::{BufMut, BytesMut};

use crate::cursor::Cursor;
use crate::error::{DecodeError, EncodeError};

// Address family codes used on the wire; not the platform's AF_* values.
const PGSQL_AF_INET: u8 = 2;
const PGSQL_AF_INET6: u8 = 3;

/// An IP address with a netmask length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Inet {
    addr: IpAddr,
    netmask: u8,
}

impl Inet {
    pub fn addr(&self) -> IpAddr {
        self.addr
    }

    /// Netmask length in bits.
    pub fn netmask(&self) -> u8 {
        self.netmask
    }
}

fn max_bits(addr: &IpAddr) -> u8 {
    match addr {
        IpAddr::V4(_) => 32,
        IpAddr::V6(_) => 128,
    }
}

/// Serializes an `INET` or `CIDR` value.
pub fn inet_to_sql(addr: IpAddr, netmask: u8, buf: &mut BytesMut) -> Result<(), EncodeError> {
    if netmask > max_bits(&addr) {
        return Err(EncodeError::InvalidValue("netmask longer than address"));
    }
    match addr {
        IpAddr::V4(v4) => {
            buf.put_u8(PGSQL_AF_INET);
            buf.put_u8(netmask);
            buf.put_u8(0);
            buf.put_u8(4);
            buf.put_slice(&v4.octets());
        }
        IpAddr::V6(v6) => {
            buf.put_u8(PGSQL_AF_INET6);
            buf.put_u8(netmask);
            buf.put_u8(0);
            buf.put_u8(16);
            buf.put_slice(&v6.octets());
        }
    }
    Ok(())
}

/// Deserializes an `INET` or `CIDR` value.
pub fn inet_from_sql(buf: &[u8]) -> Result<Inet, DecodeError> {
    let mut cur = Cursor::new(buf);
    let family = cur.read_u8()?;
    let netmask = cur.read_u8()?;
    let _is_cidr = cur.read_u8()?;
    let len = cur.read_u8()?;
    let addr = match (family, len) {
        (PGSQL_AF_INET, 4) => IpAddr::V4(Ipv4Addr::from(cur.read_array::<4>()?)),
        (PGSQL_AF_INET6, 16) => IpAddr::V6(Ipv6Addr::from(cur.read_array::<16>()?)),
        (PGSQL_AF_INET | PGSQL_AF_INET6, _) => {
            return Err(DecodeError::InvalidFormat("address length does not match family"));
        }
        _ => return Err(DecodeError::InvalidFormat("unknown inet address family")),
    };
    cur.finish()?;
    if netmask > max_bits(&addr) {
        return Err(DecodeError::InvalidFormat("netmask longer than address"));
    }
    Ok(Inet { addr, netmask })
}
