//! Interface display-name shortening.

/// Longest match first, so `TenGigabitEthernet` is not caught by `Ethernet`.
const SUBSTITUTIONS: &[(&str, &str)] = &[
    ("HundredGigabitEthernet", "Hu"),
    ("FourHundredGigE", "FH"),
    ("FortyGigabitEthernet", "Fo"),
    ("TwentyFiveGigE", "Twe"),
    ("TenGigabitEthernet", "Te"),
    ("GigabitEthernet", "GE"),
    ("FastEthernet", "Fa"),
    ("Port-Channel", "Po"),
    ("PortChannel", "Po"),
    ("Ethernet", "Eth"),
    ("Loopback", "Lo"),
    ("Management", "Mgmt"),
];

/// Shortens a long-form interface name for label display.
///
/// Only the leading family name is substituted; the slot/port suffix is kept
/// verbatim. Names that match no known family pass through unchanged.
pub fn shorten_interface(name: &str) -> String {
    for (long, short) in SUBSTITUTIONS {
        if let Some(rest) = name.strip_prefix(long) {
            return format!("{short}{rest}");
        }
    }
    name.to_string()
}
