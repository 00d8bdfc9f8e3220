// Web-Modul: Steuerseiten beider Geräte
//
// HTML-Dateien werden zur Compile-Zeit direkt ins Binary eingebettet.

/// Device 1: Geschwindigkeit ändern, Partner auslösen, LED-Index live
pub const SPEED_HTML: &str = include_str!("speed.html");

/// Device 2: Richtung umkehren, Partner auslösen, Pin-Zustände live
pub const DIRECTION_HTML: &str = include_str!("direction.html");
