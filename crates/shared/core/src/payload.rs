use std::borrow::Cow;

/// Anything that can hand over one already-serialized notification.
///
/// The gateway never looks inside a payload: it only needs the bytes and
/// their length. Producers that build the item list on demand return an
/// owned buffer, plain byte containers lend their contents.
pub trait Payload {
    /// The packaged notification bytes, embedded verbatim in a frame
    fn packaged(&self) -> Cow<'_, [u8]>;
}

impl Payload for [u8] {
    fn packaged(&self) -> Cow<'_, [u8]> {
        Cow::Borrowed(self)
    }
}

impl<const N: usize> Payload for [u8; N] {
    fn packaged(&self) -> Cow<'_, [u8]> {
        Cow::Borrowed(self.as_slice())
    }
}

impl Payload for Vec<u8> {
    fn packaged(&self) -> Cow<'_, [u8]> {
        Cow::Borrowed(self.as_slice())
    }
}

impl Payload for str {
    fn packaged(&self) -> Cow<'_, [u8]> {
        Cow::Borrowed(self.as_bytes())
    }
}

impl Payload for String {
    fn packaged(&self) -> Cow<'_, [u8]> {
        Cow::Borrowed(self.as_bytes())
    }
}

impl<T: Payload + ?Sized> Payload for &T {
    fn packaged(&self) -> Cow<'_, [u8]> {
        (**self).packaged()
    }
}

impl<T: Payload + ?Sized> Payload for Box<T> {
    fn packaged(&self) -> Cow<'_, [u8]> {
        (**self).packaged()
    }
}
