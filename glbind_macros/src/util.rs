use std::fmt::Display;

use proc_macro2::Span;

/// Accumulates the problems found while expanding a derive.
///
/// Each problem keeps the span it was found at, so that the compiler points at the offending
/// annotation rather than at the derive. All problems are reported together.
#[derive(Default)]
pub struct ErrorLog {
    combined: Option<syn::Error>,
}

impl ErrorLog {
    pub fn new() -> Self {
        ErrorLog::default()
    }

    pub fn log_error<T>(&mut self, span: Span, message: T)
    where
        T: Display,
    {
        let error = syn::Error::new(span, message);

        match &mut self.combined {
            Some(combined) => combined.combine(error),
            None => self.combined = Some(error),
        }
    }

    /// Turns the log into `Err` if anything was logged.
    pub fn compile(self) -> Result<(), syn::Error> {
        match self.combined {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn messages(error: syn::Error) -> Vec<String> {
        error.into_iter().map(|e| e.to_string()).collect()
    }

    #[test]
    fn test_empty_log_compiles() {
        assert!(ErrorLog::new().compile().is_ok());
    }

    #[test]
    fn test_single_error() {
        let mut log = ErrorLog::new();

        log.log_error(Span::call_site(), "first");

        assert_eq!(messages(log.compile().unwrap_err()), vec!["first"]);
    }

    #[test]
    fn test_errors_keep_logging_order() {
        let mut log = ErrorLog::new();

        log.log_error(Span::call_site(), "first");
        log.log_error(Span::call_site(), "second");

        assert_eq!(messages(log.compile().unwrap_err()), vec!["first", "second"]);
    }
}
