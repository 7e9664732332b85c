//! Ordered medication regimen with a session cursor.
//!
//! The dose list always keeps at least one entry; every mutation
//! preserves that and keeps the cursor on a valid index. The cursor is
//! only ever advanced by the session controller and only rewinds on an
//! explicit restart.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Regimen {
    doses: Vec<String>,
    /// Index of the dose the session is currently on. Always in
    /// `[0, doses.len())`.
    current: usize,
}

impl Regimen {
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyCollection`] for an empty dose list.
    pub fn new(doses: Vec<String>) -> Result<Self, ValidationError> {
        if doses.is_empty() {
            return Err(ValidationError::EmptyCollection("regimen".into()));
        }
        Ok(Self { doses, current: 0 })
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn doses(&self) -> &[String] {
        &self.doses
    }

    pub fn len(&self) -> usize {
        self.doses.len()
    }

    pub fn is_empty(&self) -> bool {
        // Cannot actually happen; kept for the len/is_empty pairing.
        self.doses.is_empty()
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current_dose(&self) -> &str {
        &self.doses[self.current]
    }

    /// Dose after the current one, if any.
    pub fn next_dose(&self) -> Option<&str> {
        self.doses.get(self.current + 1).map(String::as_str)
    }

    pub fn is_last_dose(&self) -> bool {
        self.current == self.doses.len() - 1
    }

    // ── Cursor ───────────────────────────────────────────────────────

    /// Move the cursor to the next dose. Callers must check
    /// [`is_last_dose`](Self::is_last_dose) beforehand.
    ///
    /// # Errors
    ///
    /// Advancing past the end is a contract violation and returns
    /// [`ValidationError::OutOfBounds`], never a silent clamp.
    pub fn advance(&mut self) -> Result<(), ValidationError> {
        if self.is_last_dose() {
            return Err(ValidationError::OutOfBounds {
                collection: "regimen".into(),
                index: self.current + 1,
                len: self.doses.len(),
            });
        }
        self.current += 1;
        Ok(())
    }

    pub fn reset_cursor(&mut self) {
        self.current = 0;
    }

    // ── Settings-time mutations ──────────────────────────────────────
    //
    // Only performed outside an active session; the controller cancels
    // any running session when settings are applied.

    /// # Errors
    ///
    /// Rejects blank names.
    pub fn add(&mut self, name: &str) -> Result<(), ValidationError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::InvalidValue {
                field: "dose name".into(),
                message: "must not be blank".into(),
            });
        }
        self.doses.push(name.to_string());
        Ok(())
    }

    /// Remove the dose at `index`, clamping the cursor on shrink.
    ///
    /// # Errors
    ///
    /// Rejects removal of the last remaining dose and out-of-range
    /// indexes.
    pub fn remove(&mut self, index: usize) -> Result<String, ValidationError> {
        if self.doses.len() <= 1 {
            return Err(ValidationError::InvalidValue {
                field: "regimen".into(),
                message: "must keep at least one dose".into(),
            });
        }
        self.check_index(index)?;
        let removed = self.doses.remove(index);
        if self.current >= self.doses.len() {
            self.current = self.doses.len() - 1;
        }
        Ok(removed)
    }

    /// # Errors
    ///
    /// Rejects blank names and out-of-range indexes.
    pub fn rename(&mut self, index: usize, name: &str) -> Result<(), ValidationError> {
        self.check_index(index)?;
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::InvalidValue {
                field: "dose name".into(),
                message: "must not be blank".into(),
            });
        }
        self.doses[index] = name.to_string();
        Ok(())
    }

    /// Swap the dose at `index` with its neighbor at `index + offset`
    /// (offset of -1 or 1).
    ///
    /// # Errors
    ///
    /// Rejects moves whose source or destination fall outside the list.
    pub fn move_dose(&mut self, index: usize, offset: i32) -> Result<(), ValidationError> {
        self.check_index(index)?;
        let target = index as i64 + offset as i64;
        if target < 0 || target as usize >= self.doses.len() {
            return Err(ValidationError::OutOfBounds {
                collection: "regimen".into(),
                index: target.max(0) as usize,
                len: self.doses.len(),
            });
        }
        self.doses.swap(index, target as usize);
        Ok(())
    }

    fn check_index(&self, index: usize) -> Result<(), ValidationError> {
        if index >= self.doses.len() {
            return Err(ValidationError::OutOfBounds {
                collection: "regimen".into(),
                index,
                len: self.doses.len(),
            });
        }
        Ok(())
    }
}
