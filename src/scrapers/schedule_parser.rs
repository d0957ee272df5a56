use crate::error::ParseError;
use crate::models::{MatchRecord, MatchStatus, ScheduleSnapshot, Side};
use crate::scrapers::standings_parser::parse_standings;
use chrono::NaiveDate;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;

/// Present on every GotSport schedule page; missing means the layout changed
const SCHEDULE_MARKER: &str = "[class*='schedule']";
const ROW_SELECTOR: &str = "[class*='schedule'] tr, [class*='schedule-row']";
const VENUE_SELECTOR: &str = "[class*='location'], [class*='venue'], [class*='field']";

const HOME_MARKER: &str = "(H)";
const AWAY_MARKER: &str = "(A)";
const UNKNOWN: &str = "TBD";

pub(crate) fn selector(css: &'static str) -> Result<Selector, ParseError> {
    Selector::parse(css).map_err(|_| ParseError::Selector(css))
}

/// Parse a schedule page into a snapshot.
///
/// A page that still has its schedule container but lists no fixtures is a valid
/// empty snapshot; a page without the container is a [`ParseError::MissingMarker`].
pub fn parse_schedule_html(html: &str, team_name: &str) -> Result<ScheduleSnapshot, ParseError> {
    let document = Html::parse_document(html);

    let marker = selector(SCHEDULE_MARKER)?;
    if document.select(&marker).next().is_none() {
        return Err(ParseError::MissingMarker("schedule container"));
    }

    let row_selector = selector(ROW_SELECTOR)?;
    let venue_selector = selector(VENUE_SELECTOR)?;

    let candidates: Vec<ElementRef> = document
        .select(&row_selector)
        .filter(|row| !inside_class(row, "standings"))
        .collect();
    let candidate_ids: HashSet<_> = candidates.iter().map(|row| row.id()).collect();

    let mut matches = Vec::new();
    for (index, row) in candidates.iter().enumerate() {
        // Outermost row wins when layouts nest rows
        if row.ancestors().any(|node| candidate_ids.contains(&node.id())) {
            continue;
        }

        if let Some(record) = parse_match_row(row, &venue_selector, team_name, index + 1)? {
            matches.push(record);
        }
    }

    Ok(ScheduleSnapshot {
        matches,
        standings: parse_standings(&document)?,
    })
}

fn inside_class(element: &ElementRef, needle: &str) -> bool {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .any(|el| class_contains(&el, needle))
}

fn class_contains(element: &ElementRef, needle: &str) -> bool {
    element
        .value()
        .attr("class")
        .map(|class| class.to_lowercase().contains(needle))
        .unwrap_or(false)
}

/// Map one row to a record. Rows without a side marker are not fixtures and yield `None`.
fn parse_match_row(
    row: &ElementRef,
    venue_selector: &Selector,
    team_name: &str,
    row_number: usize,
) -> Result<Option<MatchRecord>, ParseError> {
    let segments: Vec<String> = row
        .text()
        .map(|t| t.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|t| !t.is_empty())
        .collect();

    let has_marker = segments
        .iter()
        .any(|s| s.contains(HOME_MARKER) || s.contains(AWAY_MARKER));
    if !has_marker {
        return Ok(None);
    }

    let full_text = segments.join(" ");
    let malformed = |reason: &str| ParseError::MalformedRow {
        row: row_number,
        reason: reason.to_string(),
    };

    let date = extract_date(&full_text).ok_or_else(|| malformed("no match date"))?;
    let time = extract_time(&full_text);

    let home_team = team_before_marker(&segments, HOME_MARKER);
    let away_team = team_before_marker(&segments, AWAY_MARKER);

    let venue = row
        .select(venue_selector)
        .map(|el| el.text().collect::<Vec<_>>().join(" "))
        .map(|t| t.split_whitespace().collect::<Vec<_>>().join(" "))
        .find(|t| !t.is_empty());

    // Team names and venues can carry digit-dash-digit text, so skip them when looking for a score
    let score = segments
        .iter()
        .filter(|s| !s.contains(HOME_MARKER) && !s.contains(AWAY_MARKER))
        .filter(|s| {
            let is_team = |team: &Option<String>| team.as_deref() == Some(s.trim());
            !is_team(&home_team) && !is_team(&away_team)
        })
        .filter(|s| venue.as_deref().map_or(true, |v| !v.contains(s.as_str())))
        .find_map(|s| extract_score(s));

    let (opponent, side) = resolve_opponent(home_team.as_deref(), away_team.as_deref(), team_name)
        .ok_or_else(|| malformed("no team names"))?;

    let lowered = full_text.to_lowercase();
    let status = if lowered.contains("cancel") {
        MatchStatus::Cancelled
    } else if lowered.contains("postpone") {
        MatchStatus::Postponed
    } else if score.is_some() {
        MatchStatus::Completed
    } else {
        MatchStatus::Scheduled
    };

    Ok(Some(MatchRecord {
        date,
        time,
        home_team,
        away_team,
        opponent,
        side,
        venue,
        score,
        status,
    }))
}

/// Work out who the monitored team is playing and on which side
fn resolve_opponent(
    home: Option<&str>,
    away: Option<&str>,
    team_name: &str,
) -> Option<(String, Side)> {
    let ours = |team: &str| team.to_lowercase().contains(&team_name.to_lowercase());

    match (home, away) {
        (Some(h), Some(a)) if ours(h) => Some((a.to_string(), Side::Home)),
        (Some(h), Some(a)) if ours(a) => Some((h.to_string(), Side::Away)),
        (Some(h), Some(a)) => Some((format!("{} v {}", h, a), Side::Unknown)),
        (Some(h), None) if ours(h) => Some((UNKNOWN.to_string(), Side::Home)),
        (Some(h), None) => Some((h.to_string(), Side::Away)),
        (None, Some(a)) if ours(a) => Some((UNKNOWN.to_string(), Side::Away)),
        (None, Some(a)) => Some((a.to_string(), Side::Home)),
        (None, None) => None,
    }
}

/// The team name is the text leading up to its side marker. A bare marker
/// takes the name from the preceding text segment.
fn team_before_marker(segments: &[String], marker: &str) -> Option<String> {
    segments.iter().enumerate().find_map(|(i, segment)| {
        let pos = segment.find(marker)?;
        let name = segment[..pos].trim();
        if !name.is_empty() {
            return Some(name.to_string());
        }
        i.checked_sub(1)
            .and_then(|prev| segments.get(prev))
            .map(|prev| prev.trim().to_string())
            .filter(|prev| !prev.is_empty())
    })
}

/// Finds a date written like "Nov 08, 2025"
pub fn extract_date(text: &str) -> Option<NaiveDate> {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    tokens.windows(3).find_map(|window| {
        let month = window[0];
        if month.len() != 3 || !month.chars().all(|c| c.is_ascii_alphabetic()) {
            return None;
        }
        NaiveDate::parse_from_str(&window.join(" "), "%b %d, %Y").ok()
    })
}

/// Finds a kick-off time like "2:00 PM EST" (timezone optional)
pub fn extract_time(text: &str) -> Option<String> {
    let tokens: Vec<&str> = text.split_whitespace().collect();

    for (i, token) in tokens.iter().enumerate() {
        let upper = token.to_uppercase();

        let (clock, meridiem, next) = if let Some(clock) = upper
            .strip_suffix("AM")
            .or_else(|| upper.strip_suffix("PM"))
            .filter(|c| is_clock(c))
        {
            (clock.to_string(), upper[clock.len()..].to_string(), i + 1)
        } else if is_clock(&upper) {
            match tokens.get(i + 1).map(|t| t.to_uppercase()) {
                Some(m) if m == "AM" || m == "PM" => (upper.clone(), m, i + 2),
                _ => continue,
            }
        } else {
            continue;
        };

        let mut time = format!("{} {}", clock, meridiem);
        if let Some(zone) = tokens.get(next).filter(|z| is_timezone(z)) {
            time.push(' ');
            time.push_str(zone);
        }
        return Some(time);
    }

    None
}

fn is_clock(text: &str) -> bool {
    match text.split_once(':') {
        Some((hours, minutes)) => {
            (1..=2).contains(&hours.len())
                && minutes.len() == 2
                && hours.chars().all(|c| c.is_ascii_digit())
                && minutes.chars().all(|c| c.is_ascii_digit())
        }
        None => false,
    }
}

fn is_timezone(text: &str) -> bool {
    (3..=4).contains(&text.len())
        && text.ends_with('T')
        && text.chars().all(|c| c.is_ascii_uppercase())
}

/// Finds a result like "2 - 2" or "2-2"
pub fn extract_score(text: &str) -> Option<String> {
    let is_goals = |s: &str| !s.is_empty() && s.len() <= 3 && s.chars().all(|c| c.is_ascii_digit());
    let tokens: Vec<&str> = text.split_whitespace().collect();

    for (i, token) in tokens.iter().enumerate() {
        if let Some((home, away)) = token.split_once('-') {
            if is_goals(home) && is_goals(away) {
                return Some(format!("{} - {}", home, away));
            }
        }
        if *token == "-" && i > 0 {
            if let (Some(home), Some(away)) = (tokens.get(i - 1), tokens.get(i + 1)) {
                if is_goals(home) && is_goals(away) {
                    return Some(format!("{} - {}", home, away));
                }
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEAM: &str = "Ambassadors FC";

    fn row(date: &str, time: &str, home: &str, result: &str, away: &str, venue: &str) -> String {
        format!(
            r#"<tr class="game-row">
                <td>1042</td>
                <td><div>{date}</div><div>{time}</div></td>
                <td><a>Club</a><span>{home} (H)</span></td>
                <td class="score">{result}</td>
                <td><span>{away} (A)</span></td>
                <td class="location"><a>{venue}</a></td>
            </tr>"#
        )
    }

    fn page(rows: &[String]) -> String {
        format!(
            r#"<html><body>
            <div class="schedule-container">
              <table class="table">
                <thead><tr><th>Match #</th><th>Time</th><th>Home</th><th>Results</th><th>Away</th><th>Location</th></tr></thead>
                <tbody>{}</tbody>
              </table>
            </div>
            </body></html>"#,
            rows.join("\n")
        )
    }

    #[test]
    fn test_parse_schedule_rows() {
        let html = page(&[
            row(
                "Nov 08, 2025",
                "2:00 PM EST",
                "Manta 2014 Boys GLA",
                "",
                "Ambassadors FC 2014 Boys White",
                "Manta Park Field 2",
            ),
            row(
                "Nov 15, 2025",
                "10:30 AM EST",
                "Ambassadors FC 2014 Boys White",
                "3 - 1",
                "Columbus Rush 2014",
                "",
            ),
        ]);

        let snapshot = parse_schedule_html(&html, TEAM).unwrap();
        assert_eq!(snapshot.matches.len(), 2);
        assert!(snapshot.standings.is_empty());

        let first = &snapshot.matches[0];
        assert_eq!(first.date, NaiveDate::from_ymd_opt(2025, 11, 8).unwrap());
        assert_eq!(first.time.as_deref(), Some("2:00 PM EST"));
        assert_eq!(first.opponent, "Manta 2014 Boys GLA");
        assert_eq!(first.side, Side::Away);
        assert_eq!(first.venue.as_deref(), Some("Manta Park Field 2"));
        assert_eq!(first.score, None);
        assert_eq!(first.status, MatchStatus::Scheduled);

        let second = &snapshot.matches[1];
        assert_eq!(second.opponent, "Columbus Rush 2014");
        assert_eq!(second.side, Side::Home);
        assert_eq!(second.score.as_deref(), Some("3 - 1"));
        assert_eq!(second.status, MatchStatus::Completed);
    }

    #[test]
    fn test_missing_venue_is_kept_as_unknown() {
        let html = page(&[row(
            "Dec 06, 2025",
            "1:00 PM EST",
            "Ambassadors FC 2014 Boys White",
            "",
            "Cleveland Force",
            "",
        )]);

        let snapshot = parse_schedule_html(&html, TEAM).unwrap();
        assert_eq!(snapshot.matches.len(), 1);
        assert_eq!(snapshot.matches[0].venue, None);
    }

    #[test]
    fn test_zero_rows_is_empty_snapshot() {
        let snapshot = parse_schedule_html(&page(&[]), TEAM).unwrap();
        assert!(snapshot.matches.is_empty());
    }

    #[test]
    fn test_missing_marker_is_parse_error() {
        let html = "<html><body><h1>Page not found</h1><table><tr><td>x</td></tr></table></body></html>";
        let err = parse_schedule_html(html, TEAM).unwrap_err();
        assert_eq!(err, ParseError::MissingMarker("schedule container"));
    }

    #[test]
    fn test_row_without_date_is_rejected() {
        let html = page(&[row("TBD", "", "Ambassadors FC", "", "Cleveland Force", "")]);
        let err = parse_schedule_html(&html, TEAM).unwrap_err();
        assert!(matches!(err, ParseError::MalformedRow { .. }));
    }

    #[test]
    fn test_cancelled_status() {
        let html = page(&[row(
            "Nov 22, 2025",
            "9:00 AM EST",
            "Ambassadors FC",
            "Cancelled",
            "Cleveland Force",
            "",
        )]);
        let snapshot = parse_schedule_html(&html, TEAM).unwrap();
        assert_eq!(snapshot.matches[0].status, MatchStatus::Cancelled);
    }

    #[test]
    fn test_div_layout_with_nested_rows() {
        let html = r#"<div class="schedule">
            <div class="schedule-row">
              <div class="schedule-row-inner">
                <span>Manta 2014 Boys GLA</span><span>(H)</span>
                <span>Nov 08, 2025</span><span>2:00PM</span>
                <span>Ambassadors FC 2014 Boys White (A)</span>
                <span class="venue">Field 1 - 2</span>
              </div>
            </div>
        </div>"#;

        let snapshot = parse_schedule_html(html, TEAM).unwrap();
        assert_eq!(snapshot.matches.len(), 1);
        let record = &snapshot.matches[0];
        assert_eq!(record.opponent, "Manta 2014 Boys GLA");
        assert_eq!(record.time.as_deref(), Some("2:00 PM"));
        assert_eq!(record.venue.as_deref(), Some("Field 1 - 2"));
        assert_eq!(record.score, None);
    }

    #[test]
    fn test_postponed_status() {
        let html = page(&[row(
            "Nov 29, 2025",
            "9:00 AM EST",
            "Ambassadors FC",
            "Postponed",
            "Cleveland Force",
            "",
        )]);
        let snapshot = parse_schedule_html(&html, TEAM).unwrap();
        assert_eq!(snapshot.matches[0].status, MatchStatus::Postponed);
        assert_eq!(snapshot.matches[0].score, None);
    }

    #[test]
    fn test_team_name_with_age_range_is_not_a_score() {
        let html = r#"<div class="schedule">
            <div class="schedule-row">
              <span>Rush FC 05-06 Boys</span><span>(H)</span>
              <span>Nov 08, 2025</span>
              <span>Ambassadors FC (A)</span>
            </div>
        </div>"#;

        let snapshot = parse_schedule_html(html, TEAM).unwrap();
        let record = &snapshot.matches[0];
        assert_eq!(record.opponent, "Rush FC 05-06 Boys");
        assert_eq!(record.side, Side::Away);
        assert_eq!(record.score, None);
        assert_eq!(record.status, MatchStatus::Scheduled);
    }

    #[test]
    fn test_row_without_team_names_is_rejected() {
        let html = r#"<div class="schedule">
            <div class="schedule-row">
              <span>(H)</span><span>Nov 08, 2025</span>
            </div>
        </div>"#;

        let err = parse_schedule_html(html, TEAM).unwrap_err();
        assert_eq!(
            err,
            ParseError::MalformedRow {
                row: 1,
                reason: "no team names".to_string(),
            }
        );
    }

    #[test]
    fn test_extract_helpers() {
        assert_eq!(
            extract_date("Sat Nov 8, 2025 2:00 PM"),
            NaiveDate::from_ymd_opt(2025, 11, 8)
        );
        assert_eq!(extract_date("no date here"), None);
        assert_eq!(extract_time("kick off 2:00 PM EST"), Some("2:00 PM EST".to_string()));
        assert_eq!(extract_time("12:45pm"), Some("12:45 PM".to_string()));
        assert_eq!(extract_time("2014 Boys"), None);
        assert_eq!(extract_score("2 - 2"), Some("2 - 2".to_string()));
        assert_eq!(extract_score("4-0"), Some("4 - 0".to_string()));
        assert_eq!(extract_score("U-12 Boys"), None);
    }

    #[test]
    fn test_resolve_opponent() {
        assert_eq!(
            resolve_opponent(Some("Ambassadors FC White"), Some("Rush"), TEAM),
            Some(("Rush".to_string(), Side::Home))
        );
        assert_eq!(
            resolve_opponent(Some("Rush"), None, TEAM),
            Some(("Rush".to_string(), Side::Away))
        );
        assert_eq!(
            resolve_opponent(Some("Rush"), Some("Force"), TEAM),
            Some(("Rush v Force".to_string(), Side::Unknown))
        );
        assert_eq!(resolve_opponent(None, None, TEAM), None);
    }
}
