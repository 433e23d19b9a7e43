use std::borrow::Cow;

use bytes::Bytes;

/// Image bytes handed to the engine, regardless of how the request carried them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawImage(Bytes);

impl RawImage {
    pub fn empty() -> Self {
        Self(Bytes::new())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<[u8]> for RawImage {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<Bytes> for RawImage {
    fn from(bytes: Bytes) -> Self {
        Self(bytes)
    }
}

impl From<Vec<u8>> for RawImage {
    fn from(bytes: Vec<u8>) -> Self {
        Self(Bytes::from(bytes))
    }
}

impl From<&'static [u8]> for RawImage {
    fn from(bytes: &'static [u8]) -> Self {
        Self(Bytes::from_static(bytes))
    }
}

/// One engine call: its argument list plus the bytes fed to stdin.
#[derive(Debug, Clone)]
pub struct EngineInvocation {
    args: Vec<String>,
    input: RawImage,
}

impl EngineInvocation {
    pub fn new<I, S>(args: I, input: RawImage) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            args: args.into_iter().map(Into::into).collect(),
            input,
        }
    }

    /// An invocation whose stdin is closed immediately.
    pub fn without_input<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(args, RawImage::empty())
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn input(&self) -> &RawImage {
        &self.input
    }

    pub(crate) fn into_parts(self) -> (Vec<String>, RawImage) {
        (self.args, self.input)
    }
}

/// Everything observed from a finished engine process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineOutcome {
    pub exit_code: i32,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl EngineOutcome {
    pub fn is_success(&self) -> bool {
        self.exit_code == 0
    }

    pub fn stdout_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.stdout)
    }

    pub fn stderr_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.stderr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invocation_keeps_argument_order() {
        let invocation = EngineInvocation::new(
            ["stdin", "stdout", "-l", "eng", "txt"],
            RawImage::from(b"img".to_vec()),
        );
        assert_eq!(invocation.args(), ["stdin", "stdout", "-l", "eng", "txt"]);
        assert_eq!(invocation.input().as_ref(), b"img");
    }

    #[test]
    fn without_input_has_empty_stdin() {
        let invocation = EngineInvocation::without_input(["--version"]);
        assert!(invocation.input().is_empty());
    }

    #[test]
    fn outcome_text_is_lossy() {
        let outcome = EngineOutcome {
            exit_code: 0,
            stdout: vec![b'o', b'k', 0xff],
            stderr: Vec::new(),
        };
        assert!(outcome.is_success());
        assert_eq!(outcome.stdout_text(), "ok\u{fffd}");
        assert_eq!(outcome.stderr_text(), "");
    }
}
