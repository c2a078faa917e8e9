//! Startup banner

use super::config::is_all_interfaces;
use super::constants::APP_NAME;

/// Label column width
const W: usize = 10;

/// Print the startup banner with the API and docs URLs
pub fn print_banner(host: &str, port: u16, backend: &str, database: &str) {
    let display_host = if is_all_interfaces(host) {
        "localhost"
    } else {
        host
    };
    let base = format!("http://{}:{}", display_host, port);

    println!();
    println!(
        "  \x1b[1m\x1b[36m{}\x1b[0m \x1b[90mv{}\x1b[0m",
        APP_NAME,
        env!("CARGO_PKG_VERSION")
    );
    println!();
    println!("  \x1b[32m➜\x1b[0m  \x1b[1m{:<W$}\x1b[0m {}/api/v1", "API:", base);
    println!("  \x1b[32m➜\x1b[0m  \x1b[1m{:<W$}\x1b[0m {}/api/docs", "Docs:", base);
    if host == "127.0.0.1" || host == "localhost" {
        println!(
            "  \x1b[90m➜  {:<W$} use --host 0.0.0.0 to expose\x1b[0m",
            "Network:"
        );
    }
    println!(
        "  \x1b[90m➜  {:<W$} {} ({})\x1b[0m",
        "Database:", database, backend
    );
    println!();
}
