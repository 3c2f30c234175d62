use async_trait::async_trait;
use tokio::task;

use vendo_core::ui::DialogPresenter;

/// Stdin-backed dialog surface for the demo storefront.
pub struct ConsolePresenter;

#[async_trait]
impl DialogPresenter for ConsolePresenter {
    async fn choose(&self, title: &str, labels: &[String]) -> Option<usize> {
        println!("\n{title}");
        for (index, label) in labels.iter().enumerate() {
            println!("  {}) {}", index + 1, label);
        }
        println!("  (press enter to cancel)");

        let line = read_line().await?;
        let selection: usize = line.trim().parse().ok()?;
        if selection == 0 || selection > labels.len() {
            return None;
        }
        Some(selection - 1)
    }

    async fn show_error(&self, title: &str, message: &str) {
        eprintln!("\n{title}: {message}");
    }
}

/// Read one line from stdin without blocking the runtime. `None` on EOF
/// or a read error.
pub(crate) async fn read_line() -> Option<String> {
    task::spawn_blocking(|| {
        let mut line = String::new();
        match std::io::stdin().read_line(&mut line) {
            Ok(0) => None, // EOF
            Ok(_) => Some(line),
            Err(_) => None,
        }
    })
    .await
    .ok()
    .flatten()
}
