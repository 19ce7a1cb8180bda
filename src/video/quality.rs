/// Display text for a parsed media quality code
pub fn quality_text(code: i64) -> &'static str {
    match code {
        6 => "240P 极速",
        16 => "360P 流畅",
        32 => "480P 清晰",
        64 => "720P 高清",
        74 => "720P60 高帧率",
        80 => "1080P 高清",
        112 => "1080P60 高码率",
        116 => "1080P+ 高帧率",
        120 => "4K 超清",
        125 => "HDR 真彩色",
        126 => "杜比视界",
        127 => "8K 超高清",
        _ => "Unknown",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_codes() {
        assert_eq!(quality_text(80), "1080P 高清");
        assert_eq!(quality_text(127), "8K 超高清");
    }

    #[test]
    fn test_unknown_codes() {
        assert_eq!(quality_text(0), "Unknown");
        assert_eq!(quality_text(81), "Unknown");
        assert_eq!(quality_text(-1), "Unknown");
    }
}
