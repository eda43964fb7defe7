// SPDX-License-Identifier: MPL-2.0
//! Responsive candidate selection for `srcset` / `sizes`.
//!
//! Follows the HTML image candidate rules closely enough for an image
//! component: width (`480w`) and density (`2x`) descriptors, `sizes` entries
//! guarded by a single `min-width` / `max-width` condition, lengths in `px`
//! or `vw`.

use super::source::Viewport;

/// Source size used when `sizes` is absent or nothing matches (`100vw`).
const DEFAULT_SOURCE_SIZE: SizeLength = SizeLength::Vw(100.0);

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Descriptor {
    /// `Nw`: intrinsic width in pixels.
    Width(u32),
    /// `Nx`: pixel density.
    Density(f32),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub url: String,
    pub descriptor: Descriptor,
}

impl Candidate {
    /// Effective density of this candidate when rendered `source_size_px` wide.
    fn density(&self, source_size_px: f32) -> f32 {
        match self.descriptor {
            Descriptor::Density(x) => x,
            #[allow(clippy::cast_precision_loss)]
            Descriptor::Width(w) => w as f32 / source_size_px.max(1.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MediaCondition {
    MinWidth(f32),
    MaxWidth(f32),
}

impl MediaCondition {
    fn matches(self, viewport: Viewport) -> bool {
        match self {
            MediaCondition::MinWidth(px) => viewport.width >= px,
            MediaCondition::MaxWidth(px) => viewport.width <= px,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SizeLength {
    Px(f32),
    Vw(f32),
}

impl SizeLength {
    fn to_px(self, viewport: Viewport) -> f32 {
        match self {
            SizeLength::Px(px) => px,
            SizeLength::Vw(vw) => viewport.width * vw / 100.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SourceSize {
    pub condition: Option<MediaCondition>,
    pub length: SizeLength,
}

/// Parses a `srcset` attribute. Malformed candidates are skipped.
pub fn parse_srcset(input: &str) -> Vec<Candidate> {
    let mut candidates = Vec::new();
    let mut rest = input;

    loop {
        rest = rest.trim_start_matches(|c: char| c.is_whitespace() || c == ',');
        if rest.is_empty() {
            break;
        }

        let url_end = rest.find(char::is_whitespace).unwrap_or(rest.len());
        let raw_url = &rest[..url_end];
        rest = &rest[url_end..];

        // "a.jpg," has no descriptor
        let descriptor_text = if raw_url.ends_with(',') {
            ""
        } else {
            let descriptor_end = rest.find(',').unwrap_or(rest.len());
            let text = &rest[..descriptor_end];
            rest = &rest[descriptor_end..];
            text.trim()
        };

        let url = raw_url.trim_end_matches(',');
        if url.is_empty() {
            continue;
        }

        if let Some(descriptor) = parse_descriptor(descriptor_text) {
            candidates.push(Candidate {
                url: url.to_string(),
                descriptor,
            });
        }
    }

    candidates
}

fn parse_descriptor(text: &str) -> Option<Descriptor> {
    if text.is_empty() {
        return Some(Descriptor::Density(1.0));
    }
    if let Some(width) = text.strip_suffix('w') {
        return width
            .parse::<u32>()
            .ok()
            .filter(|w| *w > 0)
            .map(Descriptor::Width);
    }
    if let Some(density) = text.strip_suffix('x') {
        return density
            .parse::<f32>()
            .ok()
            .filter(|x| x.is_finite() && *x > 0.0)
            .map(Descriptor::Density);
    }
    None
}

/// Parses a `sizes` attribute. Unparseable entries are skipped.
pub fn parse_sizes(input: &str) -> Vec<SourceSize> {
    input
        .split(',')
        .filter_map(|entry| parse_source_size(entry.trim()))
        .collect()
}

fn parse_source_size(entry: &str) -> Option<SourceSize> {
    if entry.is_empty() {
        return None;
    }

    if let Some(after_paren) = entry.strip_prefix('(') {
        let close = after_paren.find(')')?;
        let condition = parse_condition(&after_paren[..close])?;
        let length = parse_length(after_paren[close + 1..].trim())?;
        return Some(SourceSize {
            condition: Some(condition),
            length,
        });
    }

    parse_length(entry).map(|length| SourceSize {
        condition: None,
        length,
    })
}

fn parse_condition(text: &str) -> Option<MediaCondition> {
    let (feature, value) = text.split_once(':')?;
    let px = parse_px(value.trim())?;
    match feature.trim() {
        "min-width" => Some(MediaCondition::MinWidth(px)),
        "max-width" => Some(MediaCondition::MaxWidth(px)),
        _ => None,
    }
}

fn parse_length(text: &str) -> Option<SizeLength> {
    if let Some(vw) = text.strip_suffix("vw") {
        return vw.trim().parse::<f32>().ok().map(SizeLength::Vw);
    }
    parse_px(text).map(SizeLength::Px)
}

fn parse_px(text: &str) -> Option<f32> {
    text.strip_suffix("px")
        .unwrap_or(text)
        .trim()
        .parse::<f32>()
        .ok()
        .filter(|v| v.is_finite() && *v >= 0.0)
}

/// Width in pixels the image will be rendered at, per `sizes`.
pub fn source_size_px(sizes: Option<&str>, viewport: Viewport) -> f32 {
    let parsed = sizes.map(parse_sizes).unwrap_or_default();
    parsed
        .iter()
        .find(|size| size.condition.map_or(true, |c| c.matches(viewport)))
        .map_or(DEFAULT_SOURCE_SIZE, |size| size.length)
        .to_px(viewport)
}

/// Picks the candidate with the smallest density that still covers the
/// device scale factor, or the densest one when none does.
pub fn select<'a>(
    candidates: &'a [Candidate],
    source_size_px: f32,
    scale_factor: f32,
) -> Option<&'a Candidate> {
    let mut by_density: Vec<(f32, &Candidate)> = candidates
        .iter()
        .map(|candidate| (candidate.density(source_size_px), candidate))
        .collect();
    by_density.sort_by(|a, b| a.0.total_cmp(&b.0));

    by_density
        .iter()
        .find(|(density, _)| *density >= scale_factor)
        .or_else(|| by_density.last())
        .map(|(_, candidate)| *candidate)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewport(width: f32, scale_factor: f32) -> Viewport {
        Viewport {
            width,
            scale_factor,
        }
    }

    #[test]
    fn parses_width_and_density_descriptors() {
        let candidates = parse_srcset("small.jpg 480w, large.jpg 1080w,retina.jpg 2x");
        assert_eq!(candidates.len(), 3);
        assert_eq!(candidates[0].descriptor, Descriptor::Width(480));
        assert_eq!(candidates[1].url, "large.jpg");
        assert_eq!(candidates[2].descriptor, Descriptor::Density(2.0));
    }

    #[test]
    fn missing_descriptor_defaults_to_1x() {
        let candidates = parse_srcset("a.jpg, b.jpg 2x");
        assert_eq!(candidates[0].url, "a.jpg");
        assert_eq!(candidates[0].descriptor, Descriptor::Density(1.0));
        assert_eq!(candidates[1].url, "b.jpg");
    }

    #[test]
    fn malformed_candidates_are_skipped() {
        let candidates = parse_srcset("bad.jpg 0w, worse.jpg abc, good.jpg 1.5x");
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].url, "good.jpg");
    }

    #[test]
    fn sizes_first_matching_condition_wins() {
        let sizes = "(max-width: 600px) 480px, (min-width: 1200px) 50vw, 800px";
        assert_eq!(source_size_px(Some(sizes), viewport(500.0, 1.0)), 480.0);
        assert_eq!(source_size_px(Some(sizes), viewport(1600.0, 1.0)), 800.0);
        assert_eq!(source_size_px(Some(sizes), viewport(900.0, 1.0)), 800.0);
    }

    #[test]
    fn sizes_default_to_full_viewport() {
        assert_eq!(source_size_px(None, viewport(1024.0, 1.0)), 1024.0);
        assert_eq!(source_size_px(Some("garbage"), viewport(300.0, 1.0)), 300.0);
    }

    #[test]
    fn select_prefers_smallest_sufficient_width_candidate() {
        let candidates = parse_srcset("s.jpg 400w, m.jpg 800w, l.jpg 1600w");
        let picked = select(&candidates, 700.0, 1.0).map(|c| c.url.as_str());
        assert_eq!(picked, Some("m.jpg"));

        let picked = select(&candidates, 700.0, 2.0).map(|c| c.url.as_str());
        assert_eq!(picked, Some("l.jpg"));
    }

    #[test]
    fn select_falls_back_to_densest() {
        let candidates = parse_srcset("a.jpg 1x, b.jpg 2x");
        let picked = select(&candidates, 100.0, 3.0).map(|c| c.url.as_str());
        assert_eq!(picked, Some("b.jpg"));
    }

    #[test]
    fn select_on_empty_list_is_none() {
        assert!(select(&[], 100.0, 1.0).is_none());
    }
}
