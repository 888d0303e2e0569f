/// Storage key builder.
///
/// ```
/// use keyshare_store::Key;
///
/// let k = Key::new(b"share/").u64(7).bytes(b"abc").finish();
/// assert_eq!(&k[..6], b"share/");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Key(Vec<u8>);

impl Key {
    pub fn new(prefix: &[u8]) -> Self {
        Self(prefix.to_vec())
    }

    /// Append a big-endian integer, so that numeric and byte order agree.
    pub fn u64(mut self, n: u64) -> Self {
        self.0.extend_from_slice(&n.to_be_bytes());
        self
    }

    pub fn u8(mut self, n: u8) -> Self {
        self.0.push(n);
        self
    }

    pub fn bytes(mut self, b: &[u8]) -> Self {
        self.0.extend_from_slice(b);
        self
    }

    pub fn finish(self) -> Vec<u8> {
        self.0
    }
}

impl From<Key> for Vec<u8> {
    fn from(k: Key) -> Self {
        k.0
    }
}
