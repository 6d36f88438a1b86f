/// Page dots for the carousel, e.g. `○●○○○`. Empty when hidden or without items.
pub fn render_indicators(item_count: usize, current: Option<usize>, show: bool) -> String {
    if !show || item_count == 0 {
        return String::new();
    }
    (0..item_count)
        .map(|index| if Some(index) == current { '●' } else { '○' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render() {
        assert_eq!(render_indicators(5, Some(1), true), "○●○○○");
        assert_eq!(render_indicators(3, None, true), "○○○");
        assert_eq!(render_indicators(3, Some(0), false), "");
        assert_eq!(render_indicators(0, None, true), "");
    }
}
