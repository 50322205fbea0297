use std::time::Duration;

use thiserror::Error;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuizSettingsError {
    #[error("question seconds must be between 5 and 600")]
    InvalidQuestionSeconds,

    #[error("reveal delay must be at most 10000 ms")]
    InvalidRevealDelay,

    #[error("question count must be between 1 and 50")]
    InvalidQuestionCount,

    #[error("max energy must be > 0")]
    InvalidMaxEnergy,

    #[error("energy refill seconds must be > 0")]
    InvalidEnergyRefill,
}

//
// ─── SETTINGS ──────────────────────────────────────────────────────────────────
//

/// Knobs for a quiz run and for the energy economy around it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizSettings {
    question_secs: u32,
    reveal_delay_ms: u32,
    question_count: u32,
    premium_question_count: u32,
    premium: bool,
    max_energy: u32,
    energy_refill_secs: u32,
}

impl QuizSettings {
    /// Free-tier defaults:
    /// - 30 seconds per question
    /// - 1.5 s reveal before moving on
    /// - 5 questions (10 for premium)
    /// - 5 energy, one refilled per minute
    #[must_use]
    pub fn standard() -> Self {
        Self {
            question_secs: 30,
            reveal_delay_ms: 1_500,
            question_count: 5,
            premium_question_count: 10,
            premium: false,
            max_energy: 5,
            energy_refill_secs: 60,
        }
    }

    /// Creates custom settings.
    ///
    /// # Errors
    ///
    /// Returns `QuizSettingsError` if any value is outside its allowed range.
    pub fn new(
        question_secs: u32,
        reveal_delay_ms: u32,
        question_count: u32,
        premium_question_count: u32,
        premium: bool,
        max_energy: u32,
        energy_refill_secs: u32,
    ) -> Result<Self, QuizSettingsError> {
        if !(5..=600).contains(&question_secs) {
            return Err(QuizSettingsError::InvalidQuestionSeconds);
        }
        if reveal_delay_ms > 10_000 {
            return Err(QuizSettingsError::InvalidRevealDelay);
        }
        if !(1..=50).contains(&question_count) || !(1..=50).contains(&premium_question_count) {
            return Err(QuizSettingsError::InvalidQuestionCount);
        }
        if max_energy == 0 {
            return Err(QuizSettingsError::InvalidMaxEnergy);
        }
        if energy_refill_secs == 0 {
            return Err(QuizSettingsError::InvalidEnergyRefill);
        }

        Ok(Self {
            question_secs,
            reveal_delay_ms,
            question_count,
            premium_question_count,
            premium,
            max_energy,
            energy_refill_secs,
        })
    }

    /// Same settings with a different per-question time budget.
    ///
    /// # Errors
    ///
    /// Returns `QuizSettingsError::InvalidQuestionSeconds` when out of range.
    pub fn with_question_secs(self, question_secs: u32) -> Result<Self, QuizSettingsError> {
        Self::new(
            question_secs,
            self.reveal_delay_ms,
            self.question_count,
            self.premium_question_count,
            self.premium,
            self.max_energy,
            self.energy_refill_secs,
        )
    }

    /// Same settings with a different reveal delay.
    ///
    /// # Errors
    ///
    /// Returns `QuizSettingsError::InvalidRevealDelay` when out of range.
    pub fn with_reveal_delay_ms(self, reveal_delay_ms: u32) -> Result<Self, QuizSettingsError> {
        Self::new(
            self.question_secs,
            reveal_delay_ms,
            self.question_count,
            self.premium_question_count,
            self.premium,
            self.max_energy,
            self.energy_refill_secs,
        )
    }

    #[must_use]
    pub fn with_premium(mut self, premium: bool) -> Self {
        self.premium = premium;
        self
    }

    #[must_use]
    pub fn question_secs(&self) -> u32 {
        self.question_secs
    }

    #[must_use]
    pub fn reveal_delay(&self) -> Duration {
        Duration::from_millis(u64::from(self.reveal_delay_ms))
    }

    /// Number of questions to draw, depending on the premium flag.
    #[must_use]
    pub fn question_count(&self) -> u32 {
        if self.premium {
            self.premium_question_count
        } else {
            self.question_count
        }
    }

    #[must_use]
    pub fn premium(&self) -> bool {
        self.premium
    }

    #[must_use]
    pub fn max_energy(&self) -> u32 {
        self.max_energy
    }

    #[must_use]
    pub fn energy_refill_secs(&self) -> u32 {
        self.energy_refill_secs
    }
}

impl Default for QuizSettings {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn premium_draws_more_questions() {
        let settings = QuizSettings::standard();
        assert_eq!(settings.question_count(), 5);
        assert_eq!(settings.with_premium(true).question_count(), 10);
    }

    #[test]
    fn rejects_short_question_time() {
        let err = QuizSettings::standard().with_question_secs(2).unwrap_err();
        assert_eq!(err, QuizSettingsError::InvalidQuestionSeconds);
    }

    #[test]
    fn reveal_delay_is_converted_to_duration() {
        let settings = QuizSettings::standard().with_reveal_delay_ms(250).unwrap();
        assert_eq!(settings.reveal_delay(), Duration::from_millis(250));
    }
}
