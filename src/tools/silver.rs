//! Silver-layer advisory tool.
//!
//! Static guidance for building silver tables out of the bronze layer. No data
//! access happens here.

use serde::Deserialize;

const GAMES: &str = r#"
Silver Layer Suggestions for Games:

1. **Clean Game Data**
   - Standardize team names and conference affiliations
   - Add derived fields like game_margin, total_score
   - Handle neutral site games properly
   
2. **Time Dimensions**
   - Create game_date dimension with season, week, day_of_week
   - Add playoff/bowl game indicators
   
3. **Sample SQL:**
   ```sql
   CREATE OR REFRESH LIVE TABLE games_silver AS
   SELECT 
     id as game_id,
     season,
     week,
     CASE WHEN neutral_site THEN 'Neutral' ELSE home_team END as venue_type,
     home_score + away_score as total_score,
     ABS(home_score - away_score) as margin,
     CASE WHEN week > 15 THEN 'Postseason' ELSE 'Regular' END as game_type
   FROM LIVE.games_bronze
   WHERE id IS NOT NULL
   ```
            "#;

const TEAMS: &str = r#"
Silver Layer Suggestions for Teams:

1. **Team Standardization**
   - Create master team dimension with consistent naming
   - Add current/historical conference mappings
   - Include geographic and classification data

2. **Sample SQL:**
   ```sql
   CREATE OR REFRESH LIVE TABLE teams_silver AS
   SELECT DISTINCT
     id as team_id,
     school as team_name,
     conference,
     division,
     classification,
     current_timestamp() as effective_date
   FROM LIVE.teams_bronze
   ```
            "#;

const PLAYS: &str = r#"
Silver Layer Suggestions for Plays:

1. **Play Categorization**
   - Standardize play types (rush, pass, kick, etc.)
   - Add success indicators based on down/distance
   - Calculate EPA (Expected Points Added) if possible

2. **Performance Metrics**
   - Yards after contact for rush plays
   - Air yards vs YAC for pass plays
   - Situational context (red zone, third down, etc.)

3. **Sample SQL:**
   ```sql
   CREATE OR REFRESH LIVE TABLE plays_silver AS
   SELECT 
     gameId as game_id,
     driveId as drive_id,
     playNumber as play_number,
     CASE 
       WHEN playType LIKE '%Rush%' THEN 'Rush'
       WHEN playType LIKE '%Pass%' THEN 'Pass'
       ELSE 'Other'
     END as play_category,
     yardsGained as yards_gained,
     CASE WHEN down <= 2 AND yardsGained >= yardsToGo THEN 1 ELSE 0 END as successful_play
   FROM LIVE.plays_bronze
   WHERE gameId IS NOT NULL
   ```
            "#;

/// Advisory entries in presentation order.
const SUGGESTIONS: [(&str, &str); 3] = [("games", GAMES), ("teams", TEAMS), ("plays", PLAYS)];

fn default_focus_area() -> String {
    "all".to_string()
}

/// Input for the suggest_silver_layer tool.
#[derive(Debug, Clone, Deserialize)]
pub struct SuggestSilverLayerInput {
    /// games, teams, plays, stats or all
    #[serde(default = "default_focus_area")]
    pub focus_area: String,
}

/// Advisory text for a focus area.
///
/// `all` concatenates every entry; unknown areas (including `stats`) get a
/// fallback message.
pub fn suggest_silver_layer(focus_area: &str) -> String {
    if focus_area == "all" {
        let mut response = String::from("Complete Silver Layer Architecture:\n\n");
        for (_, suggestion) in SUGGESTIONS {
            response.push_str(suggestion);
            response.push_str("\n\n---\n\n");
        }
        return response;
    }

    SUGGESTIONS
        .iter()
        .find(|(area, _)| *area == focus_area)
        .map(|(_, suggestion)| suggestion.to_string())
        .unwrap_or_else(|| format!("No suggestions available for {}", focus_area))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_area() {
        let text = suggest_silver_layer("teams");
        assert!(text.contains("Silver Layer Suggestions for Teams"));
        assert!(!text.contains("Silver Layer Suggestions for Games"));
        assert!(text.contains("teams_silver"));
    }

    #[test]
    fn test_all_areas_in_order() {
        let text = suggest_silver_layer("all");
        assert!(text.starts_with("Complete Silver Layer Architecture:"));
        let games = text.find("Suggestions for Games").unwrap();
        let teams = text.find("Suggestions for Teams").unwrap();
        let plays = text.find("Suggestions for Plays").unwrap();
        assert!(games < teams && teams < plays);
        assert_eq!(text.matches("---").count(), 3);
        assert!(text[games..teams].contains("---"));
    }

    #[test]
    fn test_advisory_text_is_verbatim() {
        assert!(GAMES.contains("\n   SELECT \n     id as game_id,"));
        assert!(GAMES.contains("   - Handle neutral site games properly\n   \n2."));
        assert!(PLAYS.contains("     CASE \n       WHEN playType"));
        for (_, suggestion) in SUGGESTIONS {
            assert!(suggestion.starts_with("\nSilver Layer Suggestions for "));
            assert!(suggestion.ends_with("   ```\n            "));
        }
    }

    #[test]
    fn test_stats_falls_back() {
        assert_eq!(
            suggest_silver_layer("stats"),
            "No suggestions available for stats"
        );
    }

    #[test]
    fn test_unknown_area_is_case_sensitive() {
        assert_eq!(
            suggest_silver_layer("Games"),
            "No suggestions available for Games"
        );
    }

    #[test]
    fn test_input_defaults_to_all() {
        let input: SuggestSilverLayerInput = serde_json::from_str("{}").unwrap();
        assert_eq!(input.focus_area, "all");
    }
}
