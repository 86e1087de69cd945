//! Canonical msgpack writer for transaction fields.
//!
//! Only the subset needed for payment transactions: maps, strings,
//! unsigned integers and binary blobs, always in their smallest encoding.
//! Callers are responsible for writing map keys in sorted order.

#[derive(Debug, Default)]
pub struct MsgpackWriter {
    buf: Vec<u8>,
}

impl MsgpackWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn map_header(&mut self, len: usize) -> &mut Self {
        if len < 16 {
            self.buf.push(0x80 | len as u8);
        } else {
            self.buf.push(0xde);
            self.buf.extend_from_slice(&(len as u16).to_be_bytes());
        }
        self
    }

    pub fn str(&mut self, value: &str) -> &mut Self {
        let len = value.len();
        if len < 32 {
            self.buf.push(0xa0 | len as u8);
        } else if len <= u8::MAX as usize {
            self.buf.push(0xd9);
            self.buf.push(len as u8);
        } else if len <= u16::MAX as usize {
            self.buf.push(0xda);
            self.buf.extend_from_slice(&(len as u16).to_be_bytes());
        } else {
            self.buf.push(0xdb);
            self.buf.extend_from_slice(&(len as u32).to_be_bytes());
        }
        self.buf.extend_from_slice(value.as_bytes());
        self
    }

    pub fn uint(&mut self, value: u64) -> &mut Self {
        if value < 0x80 {
            self.buf.push(value as u8);
        } else if value <= u8::MAX as u64 {
            self.buf.push(0xcc);
            self.buf.push(value as u8);
        } else if value <= u16::MAX as u64 {
            self.buf.push(0xcd);
            self.buf.extend_from_slice(&(value as u16).to_be_bytes());
        } else if value <= u32::MAX as u64 {
            self.buf.push(0xce);
            self.buf.extend_from_slice(&(value as u32).to_be_bytes());
        } else {
            self.buf.push(0xcf);
            self.buf.extend_from_slice(&value.to_be_bytes());
        }
        self
    }

    pub fn bin(&mut self, value: &[u8]) -> &mut Self {
        let len = value.len();
        if len <= u8::MAX as usize {
            self.buf.push(0xc4);
            self.buf.push(len as u8);
        } else if len <= u16::MAX as usize {
            self.buf.push(0xc5);
            self.buf.extend_from_slice(&(len as u16).to_be_bytes());
        } else {
            self.buf.push(0xc6);
            self.buf.extend_from_slice(&(len as u32).to_be_bytes());
        }
        self.buf.extend_from_slice(value);
        self
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uint_uses_smallest_form() {
        let mut w = MsgpackWriter::new();
        w.uint(5).uint(200).uint(1000).uint(1_500_000).uint(u64::MAX);
        assert_eq!(
            w.into_bytes(),
            vec![
                0x05,
                0xcc, 0xc8,
                0xcd, 0x03, 0xe8,
                0xce, 0x00, 0x16, 0xe3, 0x60,
                0xcf, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
            ]
        );
    }

    #[test]
    fn test_map_of_str_and_bin() {
        let mut w = MsgpackWriter::new();
        w.map_header(2).str("note").bin(b"test").str("type").str("pay");
        assert_eq!(
            w.into_bytes(),
            vec![
                0x82,
                0xa4, b'n', b'o', b't', b'e',
                0xc4, 0x04, b't', b'e', b's', b't',
                0xa4, b't', b'y', b'p', b'e',
                0xa3, b'p', b'a', b'y',
            ]
        );
    }

    #[test]
    fn test_long_str_header() {
        let value = "x".repeat(40);
        let mut w = MsgpackWriter::new();
        w.str(&value);
        let bytes = w.into_bytes();
        assert_eq!(&bytes[..2], &[0xd9, 40]);
        assert_eq!(bytes.len(), 42);
    }
}
