use std::io::Write;

use super::metrics::SearchMetrics;
use crate::config::TrainerConfig;
use crate::error::SessionError;
use crate::session::{Session, TickEvent};

/// Drives a session's tick loop to completion, forwarding iteration
/// reports to the score sink and printing rolling progress lines.
pub struct Trainer {
    config: TrainerConfig,
}

impl Trainer {
    pub fn new(config: TrainerConfig) -> Self {
        Trainer { config }
    }

    /// Run the weight search until it is done. The session must be in
    /// search mode.
    pub fn run<W: Write>(
        &self,
        session: &mut Session,
        out: &mut W,
    ) -> Result<SearchMetrics, SessionError> {
        let search = &session.config().search;
        let total_episodes = search.max_iterations * search.episodes_per_iteration;
        writeln!(
            out,
            "Starting weight search: {} iterations x {} episodes...",
            search.max_iterations, search.episodes_per_iteration
        )?;
        writeln!(out, "-------------------------------------------")?;

        let mut metrics = SearchMetrics::new();
        while !session.search().is_done() {
            match session.tick()? {
                TickEvent::EpisodeEnded { end, report } => {
                    metrics.record_episode(end);
                    if let Some(report) = report {
                        writeln!(out, "{report}")?;
                    }
                    if metrics.total_episodes() % self.config.log_interval == 0 {
                        let window = self.config.log_interval;
                        writeln!(
                            out,
                            "Episode {}/{} | iter: {} | avg_score({}): {:.1} | avg_len: {:.1} | best: {}",
                            metrics.total_episodes(),
                            total_episodes,
                            session.search().iteration(),
                            window,
                            metrics.average_score(window),
                            metrics.average_moves(window),
                            session.search().best_score().unwrap_or(0),
                        )?;
                    }
                }
                TickEvent::Stepped => {}
                TickEvent::Idle => break,
            }
        }

        writeln!(out, "-------------------------------------------")?;
        writeln!(
            out,
            "Search complete. Episodes: {} | best score: {}",
            metrics.total_episodes(),
            metrics.best_score()
        )?;
        Ok(metrics)
    }

    /// Play a fixed number of autoplay games in the session's current mode
    /// (heuristic or random) and summarize the scores.
    pub fn run_games<W: Write>(
        &self,
        session: &mut Session,
        games: usize,
        out: &mut W,
    ) -> Result<SearchMetrics, SessionError> {
        let mut metrics = SearchMetrics::new();
        while metrics.total_episodes() < games {
            match session.tick()? {
                TickEvent::EpisodeEnded { end, .. } => {
                    metrics.record_episode(end);
                    if metrics.total_episodes() % self.config.log_interval == 0 {
                        let window = self.config.log_interval;
                        writeln!(
                            out,
                            "Game {}/{} | avg_score({}): {:.1} | avg_len: {:.1} | best: {}",
                            metrics.total_episodes(),
                            games,
                            window,
                            metrics.average_score(window),
                            metrics.average_moves(window),
                            metrics.best_score(),
                        )?;
                    }
                }
                TickEvent::Stepped => {}
                // Manual mode would never finish a game on its own.
                TickEvent::Idle => break,
            }
        }

        writeln!(
            out,
            "Played {} games | avg score: {:.1} | best score: {}",
            metrics.total_episodes(),
            metrics.average_score(games),
            metrics.best_score()
        )?;
        Ok(metrics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AppConfig, SearchConfig, TrainerConfig};
    use crate::session::Mode;

    fn tiny_config() -> AppConfig {
        AppConfig {
            search: SearchConfig {
                max_iterations: 2,
                episodes_per_iteration: 2,
                ..Default::default()
            },
            training: TrainerConfig { log_interval: 2 },
            ..Default::default()
        }
    }

    #[test]
    fn test_run_completes_search_and_reports_iterations() {
        let config = tiny_config();
        let mut session = Session::new(config.clone(), Some(5)).unwrap();
        let trainer = Trainer::new(config.training);

        let mut out = Vec::new();
        let metrics = trainer.run(&mut session, &mut out).unwrap();

        assert!(session.search().is_done());
        assert_eq!(metrics.total_episodes(), 4);

        let text = String::from_utf8(out).unwrap();
        // One report line per iteration, starting "<iteration> <bestScore>".
        assert!(text.lines().any(|l| l.starts_with("0 ")));
        assert!(text.lines().any(|l| l.starts_with("1 ")));
        // Weight dump lines are grouped by layer index.
        assert!(text.lines().any(|l| l.starts_with("0`0:")));
        assert!(text.contains("Search complete."));
    }

    #[test]
    fn test_run_games_heuristic() {
        let config = tiny_config();
        let mut session = Session::new(config.clone(), Some(6)).unwrap();
        session.set_mode(Mode::Heuristic).unwrap();
        let trainer = Trainer::new(config.training);

        let mut out = Vec::new();
        let metrics = trainer.run_games(&mut session, 3, &mut out).unwrap();
        assert_eq!(metrics.total_episodes(), 3);
        assert!(metrics.best_score() > 0);
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Played 3 games"));
    }

    #[test]
    fn test_run_games_idles_out_in_manual_mode() {
        let config = tiny_config();
        let mut session = Session::new(config.clone(), Some(6)).unwrap();
        session.set_mode(Mode::Manual).unwrap();
        let trainer = Trainer::new(config.training);

        let mut out = Vec::new();
        let metrics = trainer.run_games(&mut session, 3, &mut out).unwrap();
        assert_eq!(metrics.total_episodes(), 0);
    }
}
