//! Terminal output helpers: status lines, headers and help listings

use colored::Colorize;

pub fn print_header(title: &str) {
    println!();
    println!(
        "{}",
        "╔════════════════════════════════════════════════════════════╗".bright_blue()
    );
    println!("{}", format!("║  {:<58}║", title).bright_blue());
    println!(
        "{}",
        "╚════════════════════════════════════════════════════════════╝".bright_blue()
    );
    println!();
}

pub fn print_success(message: &str) {
    println!("{}", format!("✅ {}", message).bright_green().bold());
}

pub fn print_error(message: &str) {
    eprintln!("{}", format!("❌ {}", message).bright_red().bold());
}

pub fn print_info(message: &str) {
    println!("{}", format!("ℹ️  {}", message).bright_cyan());
}

pub fn print_warning(message: &str) {
    println!("{}", format!("⚠️  {}", message).bright_yellow());
}

const TOP_HELP: &[(&str, &str)] = &[
    ("l", "List current config sections"),
    ("a", "Add new config section"),
    ("d", "Delete config section"),
    ("w", "Write the current config"),
    ("e", "Deploy system"),
    ("ld", "Load Data (OS Opendata)"),
    ("q", "Quit"),
];

const DEPLOY_HELP: &[(&str, &str)] = &[
    ("all", "Deploy API, websocket, scraper and web interface"),
    ("api", "Deploy API"),
    ("sql", "Deploy SQL"),
    ("usql", "Upgrade SQL"),
    ("web", "Deploy Web interface"),
    ("scrape", "Deploy scraper"),
    ("ws", "Deploy websocket"),
    ("tests", "Run Tests"),
    ("q", "Exit deploy mode"),
];

fn print_commands(commands: &[(&str, &str)]) {
    for (cmd, description) in commands {
        println!("{} - {}", cmd.bold(), description);
    }
}

pub fn print_top_help() {
    print_commands(TOP_HELP);
}

pub fn print_deploy_help() {
    print_commands(DEPLOY_HELP);
}
