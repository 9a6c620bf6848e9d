pub mod config;
pub mod info;
pub mod recover;
pub mod rotate;

use lens_core::viewport::Size;

/// Parse `WIDTHxHEIGHT`, e.g. `1280x800`.
pub fn parse_size(s: &str) -> Result<Size, String> {
    let (w, h) = s
        .split_once(|c: char| c == 'x' || c == 'X')
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{s}'"))?;
    let w: f64 = w.trim().parse().map_err(|_| format!("bad width '{w}'"))?;
    let h: f64 = h.trim().parse().map_err(|_| format!("bad height '{h}'"))?;
    let size = Size::new(w, h);
    if !size.is_usable() {
        return Err(format!("size must be positive, got '{s}'"));
    }
    Ok(size)
}
