use std::io::Write;

/// Abstract the process environment so commands can be driven from tests
pub trait Host: Send + Sync {
    // normal output, such as stdout
    fn output(&mut self) -> impl Write;

    // diagnostics, such as stderr
    fn error(&mut self) -> impl Write;

    /// Terminate the process. Test hosts only record the request.
    fn exit(&mut self, code: i32);
}

/// Host capturing both streams and the requested exit code
#[cfg(test)]
#[derive(Debug, Default)]
pub struct TestHost {
    pub output_buf: Vec<u8>,
    pub error_buf: Vec<u8>,
    pub exit_code: Option<i32>,
}

#[cfg(test)]
impl TestHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn output_str(&self) -> String {
        String::from_utf8_lossy(&self.output_buf).into_owned()
    }

    pub fn error_str(&self) -> String {
        String::from_utf8_lossy(&self.error_buf).into_owned()
    }
}

#[cfg(test)]
impl Host for TestHost {
    fn output(&mut self) -> impl Write {
        &mut self.output_buf
    }

    fn error(&mut self) -> impl Write {
        &mut self.error_buf
    }

    fn exit(&mut self, code: i32) {
        self.exit_code = Some(code);
    }
}
