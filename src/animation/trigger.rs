use std::str::FromStr;
use thiserror::Error;

/// Snapshot of the page and the trigger element taken on a scroll or resize tick.
/// `element_top` is relative to the document, not the viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollMetrics {
    pub scroll_y: f64,
    pub viewport_height: f64,
    pub element_top: f64,
    pub element_height: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerMetrics {
    pub client_x: f64,
    pub client_y: f64,
    pub rect_left: f64,
    pub rect_top: f64,
    pub rect_width: f64,
    pub rect_height: f64,
}

/// Pointer position relative to the centre of the region, each axis in [-0.5, 0.5].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PointerOffset {
    pub x: f64,
    pub y: f64,
}

impl PointerMetrics {
    pub fn offset(&self) -> PointerOffset {
        let axis = |pos: f64, start: f64, len: f64| {
            if len <= 0.0 {
                0.0
            } else {
                ((pos - start - len / 2.0) / len).clamp(-0.5, 0.5)
            }
        };
        PointerOffset {
            x: axis(self.client_x, self.rect_left, self.rect_width),
            y: axis(self.client_y, self.rect_top, self.rect_height),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PointerEvent {
    Move(PointerMetrics),
    Leave,
}

/// A point on an edge: a fraction of the element (or viewport) height plus a pixel nudge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Anchor {
    pub fraction: f64,
    pub px: f64,
}

impl Anchor {
    pub const TOP: Anchor = Anchor { fraction: 0.0, px: 0.0 };
    pub const CENTER: Anchor = Anchor { fraction: 0.5, px: 0.0 };
    pub const BOTTOM: Anchor = Anchor { fraction: 1.0, px: 0.0 };

    fn resolve(&self, length: f64) -> f64 {
        self.fraction * length + self.px
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Threshold {
    /// Scroll position where the element anchor meets the viewport anchor.
    Edges { element: Anchor, viewport: Anchor },
    /// Only meaningful as an end threshold: this many pixels past the start.
    AfterStart { distance: f64 },
    #[cfg(test)]
    Absolute(f64),
}

#[derive(Debug, Error, PartialEq)]
pub enum ThresholdParseError {
    #[error("empty threshold")]
    Empty,
    #[error("unrecognised edge `{0}`")]
    Edge(String),
    #[error("bad number in `{0}`")]
    Number(String),
    #[error("too many parts in `{0}`")]
    TooManyParts(String),
}

fn parse_amount(raw: &str) -> Result<(f64, bool), ThresholdParseError> {
    let (digits, percent) = match raw.strip_suffix('%') {
        Some(d) => (d, true),
        None => (raw.strip_suffix("px").unwrap_or(raw), false),
    };
    digits
        .trim()
        .parse::<f64>()
        .map(|v| (v, percent))
        .map_err(|_| ThresholdParseError::Number(raw.to_string()))
}

impl FromStr for Anchor {
    type Err = ThresholdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        // "center+=25%" / "bottom-=100"
        let (base, nudge) = match s.find("+=").or_else(|| s.find("-=")) {
            Some(idx) => (&s[..idx], Some((&s[idx..idx + 1], &s[idx + 2..]))),
            None => (s, None),
        };

        let mut anchor = match base {
            "top" | "left" => Anchor::TOP,
            "center" => Anchor::CENTER,
            "bottom" | "right" => Anchor::BOTTOM,
            other => match parse_amount(other) {
                Ok((v, true)) => Anchor { fraction: v / 100.0, px: 0.0 },
                Ok((v, false)) => Anchor { fraction: 0.0, px: v },
                Err(_) => return Err(ThresholdParseError::Edge(other.to_string())),
            },
        };

        if let Some((sign, amount)) = nudge {
            let sign = if sign == "-" { -1.0 } else { 1.0 };
            let (value, percent) = parse_amount(amount)?;
            if percent {
                anchor.fraction += sign * value / 100.0;
            } else {
                anchor.px += sign * value;
            }
        }
        Ok(anchor)
    }
}

impl FromStr for Threshold {
    type Err = ThresholdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split_whitespace().collect();
        match parts.as_slice() {
            [] => Err(ThresholdParseError::Empty),
            [first, ..] if first.starts_with("+=") => {
                if parts.len() > 2 {
                    return Err(ThresholdParseError::TooManyParts(s.to_string()));
                }
                let (distance, _) = parse_amount(&first[2..])?;
                Ok(Threshold::AfterStart { distance })
            }
            [element] => Ok(Threshold::Edges {
                element: element.parse()?,
                viewport: Anchor::TOP,
            }),
            [element, viewport] => Ok(Threshold::Edges {
                element: element.parse()?,
                viewport: viewport.parse()?,
            }),
            _ => Err(ThresholdParseError::TooManyParts(s.to_string())),
        }
    }
}

impl Threshold {
    /// Convenience for static thresholds written in section code.
    pub fn parse(s: &str) -> Threshold {
        s.parse().unwrap_or_else(|e| {
            log::warn!("Invalid threshold `{}` ({}), falling back to `top bottom`", s, e);
            Threshold::Edges { element: Anchor::TOP, viewport: Anchor::BOTTOM }
        })
    }

    fn position(&self, metrics: &ScrollMetrics, start: Option<f64>) -> f64 {
        match self {
            Threshold::Edges { element, viewport } => {
                metrics.element_top + element.resolve(metrics.element_height)
                    - viewport.resolve(metrics.viewport_height)
            }
            Threshold::AfterStart { distance } => start.unwrap_or(0.0) + distance,
            #[cfg(test)]
            Threshold::Absolute(pos) => *pos,
        }
    }
}

/// The element a section animates against plus its active scroll window.
#[derive(Debug, Clone, PartialEq)]
pub struct TriggerRegion<T> {
    pub element: T,
    pub start: Threshold,
    pub end: Threshold,
}

impl<T> TriggerRegion<T> {
    pub fn new(element: T, start: &str, end: &str) -> Self {
        Self { element, start: Threshold::parse(start), end: Threshold::parse(end) }
    }

    /// Toggle-style regions only care about where they start.
    pub fn starting_at(element: T, start: &str) -> Self {
        Self { element, start: Threshold::parse(start), end: Threshold::parse("bottom top") }
    }

    #[cfg(test)]
    pub fn with_thresholds(element: T, start: Threshold, end: Threshold) -> Self {
        Self { element, start, end }
    }

    pub fn positions(&self, metrics: &ScrollMetrics) -> (f64, f64) {
        let start = self.start.position(metrics, None);
        let end = self.end.position(metrics, Some(start));
        (start, end)
    }

    pub fn progress(&self, metrics: &ScrollMetrics) -> f64 {
        let (start, end) = self.positions(metrics);
        let span = end - start;
        if span <= 0.0 {
            return if metrics.scroll_y >= start { 1.0 } else { 0.0 };
        }
        ((metrics.scroll_y - start) / span).clamp(0.0, 1.0)
    }

    pub fn is_past_start(&self, metrics: &ScrollMetrics) -> bool {
        metrics.scroll_y >= self.start.position(metrics, None)
    }

    pub fn contains(&self, metrics: &ScrollMetrics) -> bool {
        let (start, end) = self.positions(metrics);
        metrics.scroll_y >= start && metrics.scroll_y <= end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics(scroll_y: f64) -> ScrollMetrics {
        ScrollMetrics { scroll_y, viewport_height: 1000.0, element_top: 2000.0, element_height: 600.0 }
    }

    #[test]
    fn parses_keyword_pairs() {
        let t: Threshold = "top 70%".parse().unwrap();
        assert_eq!(
            t,
            Threshold::Edges { element: Anchor::TOP, viewport: Anchor { fraction: 0.7, px: 0.0 } }
        );
    }

    #[test]
    fn parses_nudged_edges() {
        let t: Threshold = "top bottom-=100".parse().unwrap();
        assert_eq!(
            t,
            Threshold::Edges { element: Anchor::TOP, viewport: Anchor { fraction: 1.0, px: -100.0 } }
        );
        let t: Threshold = "bottom center-=25%".parse().unwrap();
        match t {
            Threshold::Edges { viewport, .. } => assert!((viewport.fraction - 0.25).abs() < 1e-9),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn parses_relative_end() {
        assert_eq!("+=800 center".parse::<Threshold>(), Ok(Threshold::AfterStart { distance: 800.0 }));
    }

    #[test]
    fn rejects_garbage() {
        assert!(matches!("middle top".parse::<Threshold>(), Err(ThresholdParseError::Edge(_))));
        assert_eq!("".parse::<Threshold>(), Err(ThresholdParseError::Empty));
        assert!(matches!("top top top".parse::<Threshold>(), Err(ThresholdParseError::TooManyParts(_))));
    }

    #[test]
    fn maps_edges_to_scroll_positions() {
        // element top (2000) meets 70% of a 1000px viewport at scroll 1300
        let region = TriggerRegion::new((), "top 70%", "bottom top");
        assert_eq!(region.positions(&metrics(0.0)), (1300.0, 2600.0));

        let region = TriggerRegion::new((), "center center", "+=800 center");
        assert_eq!(region.positions(&metrics(0.0)), (1800.0, 2600.0));
    }

    #[test]
    fn progress_is_clamped_and_monotonic() {
        let region = TriggerRegion::new((), "top bottom", "bottom top");
        let mut last = 0.0;
        for step in 0..=40 {
            let p = region.progress(&metrics(step as f64 * 100.0));
            assert!((0.0..=1.0).contains(&p));
            assert!(p >= last);
            last = p;
        }
        assert_eq!(region.progress(&metrics(0.0)), 0.0);
        assert_eq!(region.progress(&metrics(10_000.0)), 1.0);
    }

    #[test]
    fn inverted_window_steps_at_start() {
        let region = TriggerRegion::with_thresholds((), Threshold::Absolute(500.0), Threshold::Absolute(400.0));
        assert_eq!(region.progress(&metrics(499.0)), 0.0);
        assert_eq!(region.progress(&metrics(500.0)), 1.0);
    }

    #[test]
    fn pointer_offset_is_centred() {
        let m = PointerMetrics {
            client_x: 150.0,
            client_y: 100.0,
            rect_left: 100.0,
            rect_top: 100.0,
            rect_width: 100.0,
            rect_height: 200.0,
        };
        assert_eq!(m.offset(), PointerOffset { x: 0.0, y: -0.5 });
    }
}
