/// Tells the user that something happened. Implementations are expected to be best-effort and
/// never fail the session.
#[cfg_attr(test, mockall::automock)]
pub trait Notifier: Send + Sync {
    fn notify(&self, title: &str, message: &str);
}

const BANNER_WIDTH: usize = 50;

/// Prints a banner to stdout. Used whenever no desktop notification service is wired in.
pub struct ConsoleNotifier;

impl ConsoleNotifier {
    pub fn banner(title: &str, message: &str) -> String {
        let border = "*".repeat(BANNER_WIDTH);
        format!("\n\n{border}\n{title}\n{message}\n{border}\n\n")
    }
}

impl Notifier for ConsoleNotifier {
    fn notify(&self, title: &str, message: &str) {
        println!("{}", Self::banner(title, message));
    }
}

#[cfg(test)]
mod tests {
    use super::ConsoleNotifier;

    #[test]
    fn test_banner() {
        let banner = ConsoleNotifier::banner("Time's up!", "Take a 5 minute break...");
        let lines = banner.lines().collect::<Vec<_>>();
        let border = "*".repeat(50);

        assert_eq!(
            lines,
            vec![
                "",
                "",
                border.as_str(),
                "Time's up!",
                "Take a 5 minute break...",
                border.as_str(),
                "",
            ]
        );
    }
}
