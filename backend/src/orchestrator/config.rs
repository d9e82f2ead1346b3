//! Roster and timing configuration
//!
//! A [`SimulationConfig`] carries everything the orchestrator needs to
//! build the registries: labs (with TA counts and limits), courses (with
//! the labs they draw from), students (with ranked preferences), the
//! master RNG seed and the real-time pacing of the actors.
//!
//! Configs are plain serde structs, loadable from JSON. Labs and courses
//! are referenced by their position in the roster.

use crate::models::PREFERENCE_COUNT;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Configuration validation and loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("roster has no {0}")]
    EmptyRoster(&'static str),

    #[error("student {student} lists {count} preferences, expected {expected}")]
    WrongPreferenceCount {
        student: usize,
        count: usize,
        expected: usize,
    },

    #[error("student {student} prefers unknown course {course}")]
    UnknownCourse { student: usize, course: usize },

    #[error("course {course} draws from unknown lab {lab}")]
    UnknownLab { course: usize, lab: usize },

    #[error("{entity} {index} has {field} = {value}, expected a value in [0, 1]")]
    OutOfUnitRange {
        entity: &'static str,
        index: usize,
        field: &'static str,
        value: f64,
    },

    #[error("course {0} has a zero slot ceiling")]
    ZeroSlotCeiling(usize),

    #[error("lab {0} has a zero tutorial limit")]
    ZeroTutorialLimit(usize),

    #[error("lab {0} has no TAs")]
    NoTas(usize),

    #[error("failed to parse roster: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("failed to read roster: {0}")]
    Io(#[from] std::io::Error),
}

/// Real-time pacing of the actors
///
/// All values are milliseconds of wall-clock time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Wall-clock length of one simulated second
    pub tick_interval_ms: u64,

    /// How long a tutorial runs
    pub session_duration_ms: u64,

    /// Delay before course actors start, so early students can register
    pub course_start_delay_ms: u64,

    /// Upper bound on how long a course waits for a busy TA before
    /// rescanning, in case a release notification is missed
    pub staffing_poll_interval_ms: u64,

    /// Pause between watchdog sweeps (0 = just yield)
    pub watchdog_interval_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 1000,
            session_duration_ms: 2000,
            course_start_delay_ms: 1000,
            staffing_poll_interval_ms: 100,
            watchdog_interval_ms: 5,
        }
    }
}

impl TimingConfig {
    /// Millisecond-scale pacing for tests and quick runs
    pub fn fast() -> Self {
        Self {
            tick_interval_ms: 1,
            session_duration_ms: 2,
            course_start_delay_ms: 1,
            staffing_poll_interval_ms: 5,
            watchdog_interval_ms: 1,
        }
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn session_duration(&self) -> Duration {
        Duration::from_millis(self.session_duration_ms)
    }

    pub fn course_start_delay(&self) -> Duration {
        Duration::from_millis(self.course_start_delay_ms)
    }

    pub fn staffing_poll_interval(&self) -> Duration {
        Duration::from_millis(self.staffing_poll_interval_ms.max(1))
    }

    pub fn watchdog_interval(&self) -> Duration {
        Duration::from_millis(self.watchdog_interval_ms)
    }
}

/// One lab
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabConfig {
    pub name: String,
    pub ta_count: usize,
    /// Maximum tutorials each TA of this lab may take
    pub tutorial_limit: u32,
}

/// One course
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseConfig {
    pub name: String,
    pub interest: f64,
    /// Upper bound of the per-round section capacity
    pub max_slots: u32,
    /// Roster indices of the labs this course draws TAs from, in scan order
    pub labs: Vec<usize>,
}

/// One student
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentConfig {
    pub caliber: f64,
    /// Roster indices of the ranked courses, best first
    pub preferences: Vec<usize>,
    /// Simulated second at which the student fills in preferences
    #[serde(default)]
    pub submission_time: u64,
}

/// Complete simulation configuration
///
/// # Example
/// ```
/// use course_allocation_core::orchestrator::SimulationConfig;
///
/// let config = SimulationConfig::from_json_str(r#"{
///     "rng_seed": 7,
///     "labs": [{ "name": "PRECOG", "ta_count": 1, "tutorial_limit": 2 }],
///     "courses": [{ "name": "SMAI", "interest": 0.8, "max_slots": 3, "labs": [0] }],
///     "students": [{ "caliber": 0.9, "preferences": [0, 0, 0], "submission_time": 1 }]
/// }"#).unwrap();
///
/// assert_eq!(config.students.len(), 1);
/// assert_eq!(config.timing.session_duration_ms, 2000);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    #[serde(default)]
    pub rng_seed: u64,

    #[serde(default)]
    pub timing: TimingConfig,

    pub labs: Vec<LabConfig>,
    pub courses: Vec<CourseConfig>,
    pub students: Vec<StudentConfig>,
}

impl SimulationConfig {
    /// Parse and validate a JSON roster
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON roster file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Check every cross-reference and parameter range
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.students.is_empty() {
            return Err(ConfigError::EmptyRoster("students"));
        }
        if self.courses.is_empty() {
            return Err(ConfigError::EmptyRoster("courses"));
        }

        for (index, lab) in self.labs.iter().enumerate() {
            if lab.ta_count == 0 {
                return Err(ConfigError::NoTas(index));
            }
            if lab.tutorial_limit == 0 {
                return Err(ConfigError::ZeroTutorialLimit(index));
            }
        }

        for (index, course) in self.courses.iter().enumerate() {
            check_unit_range("course", index, "interest", course.interest)?;
            if course.max_slots == 0 {
                return Err(ConfigError::ZeroSlotCeiling(index));
            }
            if let Some(&lab) = course.labs.iter().find(|&&lab| lab >= self.labs.len()) {
                return Err(ConfigError::UnknownLab { course: index, lab });
            }
        }

        for (index, student) in self.students.iter().enumerate() {
            check_unit_range("student", index, "caliber", student.caliber)?;
            if student.preferences.len() != PREFERENCE_COUNT {
                return Err(ConfigError::WrongPreferenceCount {
                    student: index,
                    count: student.preferences.len(),
                    expected: PREFERENCE_COUNT,
                });
            }
            if let Some(&course) = student
                .preferences
                .iter()
                .find(|&&course| course >= self.courses.len())
            {
                return Err(ConfigError::UnknownCourse {
                    student: index,
                    course,
                });
            }
        }

        Ok(())
    }
}

fn check_unit_range(
    entity: &'static str,
    index: usize,
    field: &'static str,
    value: f64,
) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfUnitRange {
            entity,
            index,
            field,
            value,
        })
    }
}
