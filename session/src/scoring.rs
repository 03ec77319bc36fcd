//! Scoring subflow: three criteria, optional comment, review.

use juror_types::{Comment, Criterion, CriterionScore, ScoreSheet, TypesError};

use crate::SessionError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScoringStep {
    Presentation,
    Flavor,
    Experience,
    Comment,
    SubmitReview,
}

impl ScoringStep {
    /// The criterion scored on this screen, if any.
    pub fn criterion(self) -> Option<Criterion> {
        match self {
            ScoringStep::Presentation => Some(Criterion::Presentation),
            ScoringStep::Flavor => Some(Criterion::Flavor),
            ScoringStep::Experience => Some(Criterion::Experience),
            ScoringStep::Comment | ScoringStep::SubmitReview => None,
        }
    }

    fn next(self) -> Self {
        match self {
            ScoringStep::Presentation => ScoringStep::Flavor,
            ScoringStep::Flavor => ScoringStep::Experience,
            ScoringStep::Experience => ScoringStep::Comment,
            ScoringStep::Comment | ScoringStep::SubmitReview => ScoringStep::SubmitReview,
        }
    }

    fn prev(self) -> Self {
        match self {
            ScoringStep::Presentation | ScoringStep::Flavor => ScoringStep::Presentation,
            ScoringStep::Experience => ScoringStep::Flavor,
            ScoringStep::Comment => ScoringStep::Experience,
            ScoringStep::SubmitReview => ScoringStep::Comment,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ScoringFlow {
    step: ScoringStep,
    sheet: ScoreSheet,
}

impl Default for ScoringFlow {
    fn default() -> Self {
        Self {
            step: ScoringStep::Presentation,
            sheet: ScoreSheet::default(),
        }
    }
}

impl ScoringFlow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step(&self) -> ScoringStep {
        self.step
    }

    pub fn sheet(&self) -> &ScoreSheet {
        &self.sheet
    }

    pub fn mean(&self) -> f64 {
        self.sheet.mean()
    }

    pub fn next(&mut self) {
        self.step = self.step.next();
    }

    /// Step back one screen. Scores already entered are kept.
    pub fn back(&mut self) {
        self.step = self.step.prev();
    }

    /// Nudge the current criterion by `steps` tenths, clamped to `[1.0, 5.0]`.
    pub fn adjust(&mut self, steps: i32) {
        if let Some(criterion) = self.step.criterion() {
            let moved = self.sheet.get(criterion).step(steps);
            self.sheet.set(criterion, moved);
        }
    }

    /// Set the current criterion to `value`, rounded to the nearest tenth.
    pub fn set(&mut self, value: f64) -> Result<(), SessionError> {
        let Some(criterion) = self.step.criterion() else {
            return Ok(());
        };
        let score = CriterionScore::from_f64(value).map_err(|_| SessionError::ScoreOutOfRange)?;
        self.sheet.set(criterion, score);
        Ok(())
    }

    /// Replace the comment. Blank text removes it; over-long text is
    /// rejected and the previous comment kept.
    pub fn set_comment(&mut self, raw: &str, max_chars: usize) -> Result<(), SessionError> {
        if self.step != ScoringStep::Comment {
            return Ok(());
        }
        self.sheet.comment = Comment::parse(raw, max_chars).map_err(|e| match e {
            TypesError::CommentTooLong { len, max } => SessionError::CommentTooLong { len, max },
            other => SessionError::Capture(other),
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn walks_forward_and_back_keeping_scores() {
        let mut flow = ScoringFlow::new();
        flow.adjust(10);
        flow.next();
        flow.set(5.0).unwrap();
        flow.next();
        flow.adjust(-20);
        assert_eq!(flow.step(), ScoringStep::Experience);

        flow.back();
        flow.back();
        assert_eq!(flow.step(), ScoringStep::Presentation);
        assert_eq!(flow.sheet().presentation.value(), 4.0);
        assert_eq!(flow.sheet().flavor.value(), 5.0);
        assert_eq!(flow.sheet().experience.value(), 1.0);
        assert_eq!(flow.mean(), 10.0 / 3.0);
    }

    #[test]
    fn out_of_range_score_is_rejected() {
        let mut flow = ScoringFlow::new();
        assert_eq!(flow.set(5.5), Err(SessionError::ScoreOutOfRange));
        assert_eq!(flow.sheet().presentation, CriterionScore::DEFAULT);
    }

    #[test]
    fn comment_is_optional_and_capped() {
        let mut flow = ScoringFlow::new();
        for _ in 0..3 {
            flow.next();
        }
        assert_eq!(flow.step(), ScoringStep::Comment);
        flow.set_comment("crispy", 280).unwrap();
        assert_eq!(
            flow.set_comment(&"x".repeat(281), 280),
            Err(SessionError::CommentTooLong { len: 281, max: 280 })
        );
        assert_eq!(flow.sheet().comment.as_ref().map(|c| c.as_str()), Some("crispy"));
        flow.set_comment("", 280).unwrap();
        assert!(flow.sheet().comment.is_none());

        flow.next();
        flow.next();
        assert_eq!(flow.step(), ScoringStep::SubmitReview);
    }

    #[test]
    fn adjust_outside_criterion_screens_is_ignored() {
        let mut flow = ScoringFlow::new();
        for _ in 0..4 {
            flow.next();
        }
        flow.adjust(5);
        assert_eq!(flow.sheet(), &ScoreSheet::default());
    }
}
