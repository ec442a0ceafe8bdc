use std::collections::BTreeSet;

use serde::Serialize;
use tracing::{debug, info};

use crate::bouquet::{is_service_line, is_stream_line, CategoryMap};
use crate::flags::{clear_invisible, is_playable, read_flags, set_invisible, update_flags};

/// Colon position of the namespace field (`orbital position << 16 | ...`).
const NAMESPACE_FIELD: usize = 6;
const MIN_SERVICE_FIELDS: usize = 8;

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct ClassifySummary {
    pub shown: usize,
    pub hidden: usize,
    pub streams: usize,
    pub malformed: usize,
}

/// What the classifier decided for a single bouquet line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineVerdict {
    /// Not a service, or a service that is not a plain channel (marker, directory).
    Untouched,
    /// A service line that could not be parsed.
    Malformed,
    Stream,
    Visible(String),
    Hidden(String),
}

/// Network identifier a service line belongs to: the upper 16 bits of the
/// hex namespace field.
pub fn network_id(fields: &[&str]) -> Option<u32> {
    let namespace = fields.get(NAMESPACE_FIELD)?.trim();
    u32::from_str_radix(namespace, 16).ok().map(|ns| ns >> 16)
}

/// Decides the visibility of one bouquet line.
pub fn classify_line(line: &str, reachable: &BTreeSet<u32>, hide_unreachable: bool) -> LineVerdict {
    if !is_service_line(line) {
        return LineVerdict::Untouched;
    }
    if is_stream_line(line) {
        return LineVerdict::Stream;
    }

    let fields: Vec<&str> = line.split(':').collect();
    if fields.len() < MIN_SERVICE_FIELDS {
        return LineVerdict::Malformed;
    }
    let Some(flags) = read_flags(line) else {
        return LineVerdict::Malformed;
    };
    if !is_playable(flags) {
        return LineVerdict::Untouched;
    }
    let Some(network) = network_id(&fields) else {
        return LineVerdict::Malformed;
    };

    let hide = hide_unreachable && !reachable.contains(&network);
    let update: fn(u32) -> u32 = if hide { set_invisible } else { clear_invisible };
    match update_flags(line, update) {
        Some(rewritten) if hide => LineVerdict::Hidden(rewritten),
        Some(rewritten) => LineVerdict::Visible(rewritten),
        None => LineVerdict::Malformed,
    }
}

/// Sets each service's visibility and counts the active services of every
/// loaded bouquet.
pub fn classify(
    map: &mut CategoryMap,
    reachable: &BTreeSet<u32>,
    hide_unreachable: bool,
) -> ClassifySummary {
    let mut summary = ClassifySummary::default();

    for (category, entries) in map.iter_mut() {
        for bouquet in entries.iter_mut().filter_map(|e| e.bouquet_mut()) {
            let mut active = 0;
            for line in bouquet.lines.iter_mut() {
                match classify_line(line, reachable, hide_unreachable) {
                    LineVerdict::Untouched => {}
                    LineVerdict::Malformed => {
                        debug!("{}: leaving malformed service line {:?}", bouquet.filename, line);
                        summary.malformed += 1;
                    }
                    LineVerdict::Stream => {
                        active += 1;
                        summary.streams += 1;
                    }
                    LineVerdict::Visible(rewritten) => {
                        *line = rewritten;
                        active += 1;
                        summary.shown += 1;
                    }
                    LineVerdict::Hidden(rewritten) => {
                        *line = rewritten;
                        summary.hidden += 1;
                    }
                }
            }
            debug!("{} {}: {} active services", category, bouquet.filename, active);
            bouquet.active_services = Some(active);
        }
    }

    info!(
        "Classified services: {} shown, {} hidden, {} streams, {} malformed",
        summary.shown, summary.hidden, summary.streams, summary.malformed
    );
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bouquet::{empty_category_map, Bouquet, BouquetSource, IndexEntry};
    use crate::category::Category;

    fn set(ids: &[u32]) -> BTreeSet<u32> {
        ids.iter().copied().collect()
    }

    fn map_with(lines: &[&str]) -> CategoryMap {
        let mut map = empty_category_map();
        map.get_mut(&Category::Tv).unwrap().push(IndexEntry {
            raw_line: "row".to_string(),
            source: BouquetSource::Loaded(Bouquet {
                filename: "userbouquet.test.tv".to_string(),
                name: "Test".to_string(),
                lines: lines.iter().map(|l| l.to_string()).collect(),
                active_services: None,
            }),
        });
        map
    }

    fn bouquet(map: &CategoryMap) -> &Bouquet {
        map[&Category::Tv][0].bouquet().unwrap()
    }

    // Hidden means flags | INVISIBLE, and INVISIBLE is eServiceReference::isInvisible (512), not 1.
    #[test]
    fn test_unreachable_service_is_hidden() {
        let line = "#SERVICE 1:0:1:0:0:0:00010000:0:0:0:";
        assert_eq!(
            classify_line(line, &set(&[2]), true),
            LineVerdict::Hidden("#SERVICE 1:512:1:0:0:0:00010000:0:0:0:".to_string())
        );
    }

    #[test]
    fn test_reachable_service_is_shown() {
        let hidden = "#SERVICE 1:512:1:0:0:0:00010000:0:0:0:";
        assert_eq!(
            classify_line(hidden, &set(&[1]), true),
            LineVerdict::Visible("#SERVICE 1:0:1:0:0:0:00010000:0:0:0:".to_string())
        );
    }

    #[test]
    fn test_reinstate_ignores_reachability() {
        let hidden = "#SERVICE 1:512:19:283D:3FB:1:C00000:0:0:0:";
        assert_eq!(
            classify_line(hidden, &BTreeSet::new(), false),
            LineVerdict::Visible("#SERVICE 1:0:19:283D:3FB:1:C00000:0:0:0:".to_string())
        );
    }

    #[test]
    fn test_network_id_sentinels() {
        let terrestrial = "#SERVICE 1:0:1:1:1:1:EEEE0000:0:0:0:";
        let cable = "#SERVICE 1:0:1:1:1:1:FFFF0000:0:0:0:";
        assert!(matches!(classify_line(terrestrial, &set(&[0xEEEE]), true), LineVerdict::Visible(_)));
        assert!(matches!(classify_line(cable, &set(&[0xEEEE]), true), LineVerdict::Hidden(_)));
        assert_eq!(network_id(&["", "", "", "", "", "", "C00000"]), Some(0xC0));
    }

    #[test]
    fn test_markers_and_malformed_lines_untouched() {
        let reachable = set(&[]);
        assert_eq!(
            classify_line("#SERVICE 1:64:0:0:0:0:0:0:0:0:\n#DESCRIPTION --- News ---", &reachable, true),
            LineVerdict::Untouched
        );
        assert_eq!(classify_line("#SERVICE 1:0:1:0:0", &reachable, true), LineVerdict::Malformed);
        assert_eq!(
            classify_line("#SERVICE 1:abc:1:0:0:0:0:0:0:0:", &reachable, true),
            LineVerdict::Malformed
        );
        assert_eq!(
            classify_line("#SERVICE 1:0:1:0:0:0:zz:0:0:0:", &reachable, true),
            LineVerdict::Malformed
        );
        assert_eq!(classify_line("#NAME Test", &reachable, true), LineVerdict::Untouched);
    }

    #[test]
    fn test_stream_lines_are_active_and_unchanged() {
        let stream = "#SERVICE 4097:512:1:0:0:0:0:0:0:0:http%3a//example.org/tv.m3u8:Example";
        let mut map = map_with(&[stream]);
        let summary = classify(&mut map, &BTreeSet::new(), true);
        assert_eq!(bouquet(&map).lines[0], stream);
        assert_eq!(bouquet(&map).active_services, Some(1));
        assert_eq!(summary.streams, 1);
    }

    #[test]
    fn test_classify_counts_active_services() {
        let mut map = map_with(&[
            "#NAME Test",
            "#SERVICE 1:0:19:283D:3FB:1:C00000:0:0:0:\n#DESCRIPTION Das Erste",
            "#SERVICE 1:0:19:EF10:421:1:820000:0:0:0:",
            "#SERVICE 1:64:0:0:0:0:0:0:0:0:",
            "#SERVICE 1:0:1:0:0",
        ]);
        let summary = classify(&mut map, &set(&[0xC0]), true);
        let b = bouquet(&map);
        assert_eq!(b.active_services, Some(1));
        assert_eq!(b.lines[1], "#SERVICE 1:0:19:283D:3FB:1:C00000:0:0:0:\n#DESCRIPTION Das Erste");
        assert_eq!(b.lines[2], "#SERVICE 1:512:19:EF10:421:1:820000:0:0:0:");
        assert_eq!(
            summary,
            ClassifySummary { shown: 1, hidden: 1, streams: 0, malformed: 1 }
        );
    }

    #[test]
    fn test_active_count_bounds() {
        let lines = [
            "#SERVICE 1:0:19:283D:3FB:1:C00000:0:0:0:",
            "#SERVICE 1:0:19:EF10:421:1:820000:0:0:0:",
            "#SERVICE 1:0:1:1:1:1:EEEE0000:0:0:0:",
        ];
        let mut none = map_with(&lines);
        classify(&mut none, &BTreeSet::new(), true);
        assert_eq!(bouquet(&none).active_services, Some(0));

        let mut all = map_with(&lines);
        classify(&mut all, &set(&[0x82, 0xC0, 0xEEEE]), true);
        assert_eq!(bouquet(&all).active_services, Some(3));
    }

    #[test]
    fn test_classify_is_idempotent() {
        let mut map = map_with(&[
            "#SERVICE 1:0:19:283D:3FB:1:C00000:0:0:0:",
            "#SERVICE 1:0:19:EF10:421:1:820000:0:0:0:",
        ]);
        let reachable = set(&[0x82]);
        classify(&mut map, &reachable, true);
        let first = bouquet(&map).lines.clone();
        classify(&mut map, &reachable, true);
        assert_eq!(bouquet(&map).lines, first);
        assert_eq!(bouquet(&map).active_services, Some(1));
    }
}
