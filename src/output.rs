// output.rs -- Operator-facing console messages

use colored::Colorize;

/// Informational progress line.
pub fn einfo(message: &str) {
    println!(" {} {}", "*".green(), message);
}

/// Non-fatal warning.
pub fn ewarn(message: &str) {
    eprintln!(" {} {}", "*".yellow(), message);
}

/// Error line.
pub fn eerror(message: &str) {
    eprintln!(" {} {}", "*".red(), message);
}

/// Begin a long-running operation; pair with eend.
pub fn ebegin(message: &str) {
    print!(" {} {} ...", "*".green(), message);
    std::io::Write::flush(&mut std::io::stdout()).ok();
}

/// Close out an ebegin line.
pub fn eend(exit_code: i32) {
    if exit_code == 0 {
        println!(" {}", "[ ok ]".green());
    } else {
        println!(" {}", "[ !! ]".red());
    }
}
