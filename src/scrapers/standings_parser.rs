use crate::error::ParseError;
use crate::models::StandingsRecord;
use crate::scrapers::schedule_parser::selector;
use scraper::{ElementRef, Html};

const STANDINGS_TABLE: &str = "table[class*='standings'], [class*='standings'] table";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Column {
    Position,
    Team,
    Played,
    Wins,
    Draws,
    Losses,
    GoalsFor,
    GoalsAgainst,
    Points,
}

impl Column {
    fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "#" | "pos" | "rank" | "position" => Some(Column::Position),
            "team" | "club" | "team name" => Some(Column::Team),
            "mp" | "gp" | "p" | "played" => Some(Column::Played),
            "w" | "wins" => Some(Column::Wins),
            "d" | "t" | "draws" | "ties" => Some(Column::Draws),
            "l" | "losses" => Some(Column::Losses),
            "gf" => Some(Column::GoalsFor),
            "ga" => Some(Column::GoalsAgainst),
            "pts" | "points" => Some(Column::Points),
            _ => None,
        }
    }
}

/// Parse every standings table on the page. Pages without standings give an empty list.
pub fn parse_standings(document: &Html) -> Result<Vec<StandingsRecord>, ParseError> {
    let table_selector = selector(STANDINGS_TABLE)?;
    let row_selector = selector("tr")?;
    let header_selector = selector("th")?;
    let cell_selector = selector("td")?;

    let mut standings = Vec::new();

    for table in document.select(&table_selector) {
        let columns: Vec<Option<Column>> = table
            .select(&row_selector)
            .map(|row| {
                row.select(&header_selector)
                    .map(|th| Column::from_label(&cell_text(&th)))
                    .collect::<Vec<_>>()
            })
            .find(|labels| !labels.is_empty())
            .unwrap_or_default();

        if !columns.contains(&Some(Column::Team)) {
            return Err(ParseError::MissingMarker("standings team column"));
        }

        for (index, row) in table.select(&row_selector).enumerate() {
            let cells: Vec<String> = row.select(&cell_selector).map(|td| cell_text(&td)).collect();
            // Header rows, spacers and "no results" banners
            if cells.len() < 2 {
                continue;
            }

            let mut record = StandingsRecord::default();
            for (column, value) in columns.iter().zip(&cells) {
                let Some(column) = column else { continue };
                match column {
                    Column::Team => record.team = value.clone(),
                    Column::Position => record.position = parse_number(value),
                    Column::Played => record.played = parse_number(value),
                    Column::Wins => record.wins = parse_number(value),
                    Column::Draws => record.draws = parse_number(value),
                    Column::Losses => record.losses = parse_number(value),
                    Column::GoalsFor => record.goals_for = parse_number(value),
                    Column::GoalsAgainst => record.goals_against = parse_number(value),
                    Column::Points => record.points = parse_number(value),
                }
            }

            if record.team.is_empty() {
                return Err(ParseError::MalformedRow {
                    row: index + 1,
                    reason: "standings row without a team".to_string(),
                });
            }
            standings.push(record);
        }
    }

    Ok(standings)
}

fn cell_text(cell: &ElementRef) -> String {
    cell.text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

fn parse_number(value: &str) -> Option<u32> {
    value.trim().trim_end_matches('.').parse().ok()
}
