use std::{env, env::VarError};

/// There's no real CLI for the server. Any argument prints the help text and the current configuration.
pub fn handle_command_line_args() -> bool {
    let has_cli_args = env::args().count() > 1;
    if has_cli_args {
        display_readme();
        display_envs();
    }
    has_cli_args
}

fn display_readme() {
    const README: &str = include_str!("./cli-help.txt");
    println!("\n{README}\n");
}

fn display_envs() {
    const DISPLAY_ENVS: [&str; 14] = [
        "RUST_LOG",
        "MM_HOST",
        "MM_PORT",
        "MM_DATABASE_URL",
        "MM_RUN_MIGRATIONS",
        "MM_DAILY_LIMIT",
        "MM_COOLDOWN_DAYS",
        "MM_GRACE_HOURS",
        "MM_INTEREST_COST",
        "MM_TIMEZONE",
        "MM_OPERATION_TIMEOUT_SECS",
        "MM_MATCH_TTL_DAYS",
        "MM_EXPIRY_INTERVAL_SECS",
        "MM_NOTIFICATION_WEBHOOK_URL",
    ];

    println!("Current environment values:");
    DISPLAY_ENVS.iter().for_each(|&name| {
        let val = match env::var(name) {
            Ok(s) => s,
            Err(VarError::NotPresent) => "Not set".into(),
            Err(VarError::NotUnicode(s)) => format!("Invalid value: {}", s.to_string_lossy()),
        };
        println!("  {name:<35} {val:<15}");
    })
}
