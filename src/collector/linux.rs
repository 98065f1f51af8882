// Linux helpers: /proc/net connection counts, uptime and size formatting.

/// Counts ESTABLISHED (state `01`) sockets in a /proc/net/tcp{,6} table.
pub fn count_established(table: &str) -> u32 {
    table
        .lines()
        .skip(1)
        .filter(|line| line.split_whitespace().nth(3) == Some("01"))
        .count() as u32
}

/// Established TCP connections over IPv4 and IPv6; 0 when /proc is unavailable.
pub(super) fn read_established_connections() -> u32 {
    #[cfg(target_os = "linux")]
    {
        let mut total = 0;
        for path in ["/proc/net/tcp", "/proc/net/tcp6"] {
            match std::fs::read_to_string(path) {
                Ok(content) => total += count_established(&content),
                Err(e) => tracing::debug!(error = %e, path, "connection table unreadable"),
            }
        }
        total
    }
    #[cfg(not(target_os = "linux"))]
    0
}

/// `"3 days, 4:05"`, `"1 day, 0:10"` or `"4:05"` under a day.
pub fn format_uptime(secs: u64) -> String {
    let days = secs / 86_400;
    let hours = (secs % 86_400) / 3_600;
    let minutes = (secs % 3_600) / 60;
    match days {
        0 => format!("{}:{:02}", hours, minutes),
        1 => format!("1 day, {}:{:02}", hours, minutes),
        d => format!("{} days, {}:{:02}", d, hours, minutes),
    }
}

/// `df -h` style: one decimal below 10 units, none above (e.g. "9.5G", "112G").
pub fn humanize_bytes(bytes: u64) -> String {
    const UNITS: [&str; 6] = ["B", "K", "M", "G", "T", "P"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{}B", bytes)
    } else if value < 10.0 {
        format!("{:.1}{}", value, UNITS[unit])
    } else {
        format!("{:.0}{}", value, UNITS[unit])
    }
}
