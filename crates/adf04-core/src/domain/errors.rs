use std::error::Error;
use std::fmt::{Display, Formatter};

pub type Adf04Result<T> = Result<T, Adf04Error>;
pub type ParserResult<T> = Adf04Result<T>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Adf04ErrorCategory {
    Usage,
    Parse,
    Remap,
    Format,
    Io,
}

impl Adf04ErrorCategory {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Usage => "Usage",
            Self::Parse => "Parse",
            Self::Remap => "Remap",
            Self::Format => "Format",
            Self::Io => "Io",
        }
    }

    pub const fn exit_code(self) -> i32 {
        match self {
            Self::Usage => 2,
            Self::Parse => 3,
            Self::Remap => 4,
            Self::Format => 5,
            Self::Io => 6,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Adf04Error {
    category: Adf04ErrorCategory,
    code: &'static str,
    message: String,
    line: Option<usize>,
    file: Option<String>,
}

impl Adf04Error {
    pub fn new(
        category: Adf04ErrorCategory,
        code: &'static str,
        message: impl Into<String>,
    ) -> Self {
        Self {
            category,
            code,
            message: message.into(),
            line: None,
            file: None,
        }
    }

    pub fn usage(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(Adf04ErrorCategory::Usage, code, message)
    }

    pub fn parse(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(Adf04ErrorCategory::Parse, code, message)
    }

    pub fn remap(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(Adf04ErrorCategory::Remap, code, message)
    }

    pub fn format(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(Adf04ErrorCategory::Format, code, message)
    }

    pub fn io(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(Adf04ErrorCategory::Io, code, message)
    }

    pub fn with_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }

    pub fn in_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }

    pub const fn category(&self) -> Adf04ErrorCategory {
        self.category
    }

    pub const fn code(&self) -> &'static str {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn line(&self) -> Option<usize> {
        self.line
    }

    pub fn file(&self) -> Option<&str> {
        self.file.as_deref()
    }

    pub const fn exit_code(&self) -> i32 {
        self.category.exit_code()
    }

    pub fn diagnostic_line(&self) -> String {
        let mut location = String::new();
        if let Some(file) = &self.file {
            location.push_str(file);
            location.push(':');
        }
        if let Some(line) = self.line {
            location.push_str(&format!("{line}:"));
        }
        if location.is_empty() {
            format!("ERROR: [{}] {}", self.code, self.message)
        } else {
            format!("ERROR: [{}] {} {}", self.code, location, self.message)
        }
    }
}

impl Display for Adf04Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} [{}] {}",
            self.category.as_str(),
            self.code,
            self.message
        )?;
        if let Some(file) = &self.file {
            write!(f, " (file {file})")?;
        }
        if let Some(line) = self.line {
            write!(f, " (line {line})")?;
        }
        Ok(())
    }
}

impl Error for Adf04Error {}

#[cfg(test)]
mod tests {
    use super::{Adf04Error, Adf04ErrorCategory};

    #[test]
    fn category_exit_codes_are_stable() {
        let cases = [
            (Adf04ErrorCategory::Usage, 2),
            (Adf04ErrorCategory::Parse, 3),
            (Adf04ErrorCategory::Remap, 4),
            (Adf04ErrorCategory::Format, 5),
            (Adf04ErrorCategory::Io, 6),
        ];
        for (category, exit_code) in cases {
            assert_eq!(category.exit_code(), exit_code);
        }
    }

    #[test]
    fn diagnostic_line_carries_file_and_line_context() {
        let error = Adf04Error::parse("PARSE.MISSING_SENTINEL", "rate block never terminated")
            .with_line(42)
            .in_file("fe23.dat");

        assert_eq!(error.category(), Adf04ErrorCategory::Parse);
        assert_eq!(error.exit_code(), 3);
        assert_eq!(
            error.diagnostic_line(),
            "ERROR: [PARSE.MISSING_SENTINEL] fe23.dat:42: rate block never terminated"
        );
    }

    #[test]
    fn display_renders_category_code_and_message() {
        let error = Adf04Error::remap("REMAP.NOT_BIJECTIVE", "image does not cover level domain");
        assert_eq!(
            error.to_string(),
            "Remap [REMAP.NOT_BIJECTIVE] image does not cover level domain"
        );
    }
}
