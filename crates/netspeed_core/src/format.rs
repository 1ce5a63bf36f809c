//! Formatação de taxas de transferência para exibição.

use crate::sampler::Throughput;

/// Unidades em ordem crescente. GB/s é o teto.
const UNITS: [&str; 4] = ["B/s", "KB/s", "MB/s", "GB/s"];

/// Formata uma taxa em bytes/s escolhendo a maior unidade cujo valor
/// escalado fique abaixo de 1024, com uma casa decimal.
///
/// Valores negativos ou não finitos são tratados como zero.
pub fn format_speed(bytes_per_sec: f64) -> String {
    let mut value = if bytes_per_sec.is_finite() && bytes_per_sec > 0.0 {
        bytes_per_sec
    } else {
        0.0
    };

    // Compara o valor já arredondado para nunca exibir "1024.0"
    let mut unit = 0;
    while round_tenth(value) >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    format!("{value:.1} {}", UNITS[unit])
}

fn round_tenth(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

/// Uma linha do overlay: ícone seguido da taxa formatada.
pub fn format_line(icon: &str, bytes_per_sec: f64) -> String {
    if icon.is_empty() {
        format_speed(bytes_per_sec)
    } else {
        format!("{icon} {}", format_speed(bytes_per_sec))
    }
}

/// Texto completo do overlay (upload na primeira linha, download na segunda).
pub fn format_overlay_text(upload_icon: &str, download_icon: &str, rate: &Throughput) -> String {
    format!(
        "{}\n{}",
        format_line(upload_icon, rate.up_bytes_per_sec),
        format_line(download_icon, rate.down_bytes_per_sec)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_is_bytes() {
        assert_eq!(format_speed(0.0), "0.0 B/s");
    }

    #[test]
    fn kilobytes_and_megabytes() {
        assert_eq!(format_speed(1536.0), "1.5 KB/s");
        assert_eq!(format_speed(1_048_576.0), "1.0 MB/s");
        assert_eq!(format_speed(3.0 * 1024.0 * 1024.0 * 1024.0), "3.0 GB/s");
    }

    #[test]
    fn boundary_switches_unit() {
        assert_eq!(format_speed(1023.0), "1023.0 B/s");
        assert_eq!(format_speed(1024.0), "1.0 KB/s");
        assert_eq!(format_speed(1024.0 * 1024.0 - 1024.0), "1023.0 KB/s");
    }

    #[test]
    fn rounding_up_to_1024_moves_to_next_unit() {
        assert_eq!(format_speed(1023.97), "1.0 KB/s");
        assert_eq!(format_speed(1023.9 * 1024.0 + 60.0), "1.0 MB/s");
        assert_eq!(format_speed(1023.94), "1023.9 B/s");
    }

    #[test]
    fn gigabytes_is_ceiling() {
        let tb = 2048.0 * 1024.0 * 1024.0 * 1024.0;
        assert_eq!(format_speed(tb), "2048.0 GB/s");
    }

    #[test]
    fn negative_and_nan_clamp_to_zero() {
        assert_eq!(format_speed(-500.0), "0.0 B/s");
        assert_eq!(format_speed(f64::NAN), "0.0 B/s");
    }

    #[test]
    fn overlay_text_has_upload_then_download() {
        let rate = Throughput {
            up_bytes_per_sec: 1536.0,
            down_bytes_per_sec: 1_048_576.0,
        };
        assert_eq!(
            format_overlay_text("Up:", "Dn:", &rate),
            "Up: 1.5 KB/s\nDn: 1.0 MB/s"
        );
        assert_eq!(format_line("", 0.0), "0.0 B/s");
    }
}
