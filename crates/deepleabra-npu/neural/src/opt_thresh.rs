// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*
 * Copyright 2025 Neuraville Inc.
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 */

//! Delta-based send gating
//!
//! Units only send when their signal changed by more than `delta` since the last send.
//! A unit that drops below `send` retracts everything it sent, exactly once.

use serde::{Deserialize, Serialize};

/// Send optimization thresholds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptThreshParams {
    /// Minimum value for a unit to send at all
    pub send: f32,
    /// Minimum change since the last send
    pub delta: f32,
}

impl Default for OptThreshParams {
    fn default() -> Self {
        Self {
            send: 0.1,
            delta: 0.005,
        }
    }
}

impl OptThreshParams {
    /// Compute the delta to send for one unit and update its `sent` value.
    ///
    /// Returns `None` when nothing should be sent this cycle.
    ///
    /// # Example
    /// ```
    /// use deepleabra_npu_neural::OptThreshParams;
    ///
    /// let thr = OptThreshParams::default();
    /// let mut sent = 0.0;
    /// assert_eq!(thr.delta_to_send(0.5, &mut sent), Some(0.5));
    /// assert_eq!(sent, 0.5);
    /// assert_eq!(thr.delta_to_send(0.501, &mut sent), None); // below delta
    /// assert_eq!(thr.delta_to_send(0.0, &mut sent), Some(-0.5)); // retract
    /// assert_eq!(sent, 0.0);
    /// ```
    #[inline]
    pub fn delta_to_send(&self, value: f32, sent: &mut f32) -> Option<f32> {
        if value > self.send {
            let delta = value - *sent;
            if delta.abs() > self.delta {
                *sent = value;
                return Some(delta);
            }
            None
        } else if *sent > self.send {
            let delta = -*sent;
            *sent = 0.0;
            Some(delta)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_silent_unit_never_sends() {
        let thr = OptThreshParams::default();
        let mut sent = 0.0;
        assert_eq!(thr.delta_to_send(0.05, &mut sent), None);
        assert_eq!(sent, 0.0);
    }

    #[test]
    fn test_small_changes_are_suppressed() {
        let thr = OptThreshParams::default();
        let mut sent = 0.4;
        assert_eq!(thr.delta_to_send(0.403, &mut sent), None);
        assert_eq!(sent, 0.4);
        let d = thr.delta_to_send(0.45, &mut sent).unwrap();
        assert!((d - 0.05).abs() < 1e-6);
        assert_eq!(sent, 0.45);
    }

    #[test]
    fn test_retraction_happens_once() {
        let thr = OptThreshParams::default();
        let mut sent = 0.3;
        assert_eq!(thr.delta_to_send(0.0, &mut sent), Some(-0.3));
        assert_eq!(thr.delta_to_send(0.0, &mut sent), None);
    }
}
