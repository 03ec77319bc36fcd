//! Text rendering of the session for the kiosk terminal.

use std::fmt::Write;

use juror_session::{
    CaptureStep, GeoStatus, IdentityStep, Phase, ScoringFlow, ScoringStep, VotingSession,
};
use juror_types::{Criterion, Facing};
use juror_utils::format_countdown;

/// Render the juror-facing screen for the session's current state.
pub fn render(session: &VotingSession) -> String {
    let mut out = String::new();
    match session.plate() {
        Some(plate) => {
            let _ = writeln!(
                out,
                "== {} @ {} ({}) ==",
                plate.name, plate.restaurant, plate.category
            );
        }
        None => {
            let _ = writeln!(out, "== plate #{} ==", session.plate_id());
        }
    }

    match session.phase() {
        Phase::Entry { loading: Some(_) } => out.push_str("Loading plate..."),
        Phase::Entry { loading: None } => out.push_str("Starting..."),
        Phase::Identity(flow) => {
            match flow.step() {
                IdentityStep::IdEntry => out.push_str("Enter your national ID: id <number>"),
                IdentityStep::PhoneEntry => out.push_str("Enter your phone number: phone <number>"),
                IdentityStep::CodeEntry => {
                    let sent_to = flow.phone().map(|p| p.e164()).unwrap_or_default();
                    let _ = write!(out, "Code sent to {sent_to}: [{:_<6}]", flow.code_buffer());
                    if flow.can_resend() {
                        out.push_str("\nDidn't get it? resend");
                    } else {
                        let _ = write!(
                            out,
                            "\nNew code available in {}",
                            format_countdown(flow.resend_remaining())
                        );
                    }
                }
                IdentityStep::Verified => out.push_str("Verified."),
            }
            if flow.is_busy() {
                out.push_str("\n(please wait...)");
            }
        }
        Phase::PlateConfirm { checking: Some(_) } => out.push_str("Checking earlier votes..."),
        Phase::PlateConfirm { checking: None } => {
            out.push_str("Is this the dish you are eating? confirm")
        }
        Phase::Capture(flow) => {
            match flow.step() {
                CaptureStep::AwaitCamera { failure: None } => {
                    let _ = write!(out, "Starting {} camera...", facing_name(flow.facing()));
                }
                CaptureStep::AwaitCamera { failure: Some(e) } => {
                    let _ = write!(out, "Camera unavailable ({e}). camera to retry");
                }
                CaptureStep::Framing => {
                    let _ = write!(
                        out,
                        "Frame the dish with the {} camera: capture | flip",
                        facing_name(flow.facing())
                    );
                }
                CaptureStep::Review { photo } => {
                    let _ = write!(
                        out,
                        "Photo {}x{} taken: use | retake",
                        photo.width(),
                        photo.height()
                    );
                }
                CaptureStep::Analyzing { progress, .. } => {
                    let _ = write!(out, "Checking photo... {progress}%");
                }
                CaptureStep::Approved { .. } => out.push_str("Photo approved."),
            }
            out.push('\n');
            render_location(session, &mut out);
        }
        Phase::Scoring(flow) => render_scoring(flow, &mut out),
        Phase::Submitting { .. } => out.push_str("Sending your vote..."),
        Phase::Result(receipt) => {
            let _ = write!(
                out,
                "Vote recorded! This plate is now #{} in the ranking.",
                receipt.ranking_position
            );
            if let Some(badge) = &receipt.badge_unlocked {
                let _ = write!(out, "\nBadge unlocked: {badge}");
            }
        }
        Phase::AlreadyVoted => {
            out.push_str("You have already voted for this plate in this edition.")
        }
        Phase::Error => out.push_str("Something went wrong. retry | quit"),
        Phase::Abandoned => out.push_str("Session closed."),
    }

    if let Some(notice) = session.notice() {
        let _ = write!(out, "\n! {notice}");
    }
    out
}

fn render_location(session: &VotingSession, out: &mut String) {
    match session.geo() {
        GeoStatus::Idle => {}
        GeoStatus::Pending(_) => out.push_str("Locating you..."),
        GeoStatus::Resolved(fix) if fix.in_radius => {
            let _ = write!(out, "At the restaurant ({:.0} m).", fix.distance_m);
        }
        GeoStatus::Resolved(fix) => {
            let _ = write!(
                out,
                "{:.0} m from the restaurant; move closer and relocate",
                fix.distance_m
            );
        }
        GeoStatus::Failed(e) => {
            let _ = write!(out, "Location unavailable ({e}). relocate to retry");
        }
    }
}

fn render_scoring(flow: &ScoringFlow, out: &mut String) {
    let sheet = flow.sheet();
    match flow.step() {
        ScoringStep::Comment => {
            let current = sheet.comment.as_ref().map(|c| c.as_str()).unwrap_or("");
            let _ = write!(out, "Comment (optional): \"{current}\"\ncomment <text> | next | back");
        }
        ScoringStep::SubmitReview => {
            for criterion in Criterion::ALL {
                let _ = writeln!(out, "{criterion:>12}: {:.1}", sheet.get(criterion).value());
            }
            let _ = writeln!(out, "{:>12}: {:.1}", "average", flow.mean());
            if let Some(comment) = &sheet.comment {
                let _ = writeln!(out, "{:>12}: \"{}\"", "comment", comment.as_str());
            }
            out.push_str("submit | back");
        }
        step => {
            if let Some(criterion) = step.criterion() {
                let _ = write!(
                    out,
                    "Rate the {criterion}: {:.1} / 5.0\nscore <1-5> | + | - | next | back",
                    sheet.get(criterion).value()
                );
            }
        }
    }
}

fn facing_name(facing: Facing) -> &'static str {
    match facing {
        Facing::Front => "front",
        Facing::Back => "back",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use juror_gateway::GatewayError;
    use juror_session::{Effect, Event};
    use juror_types::{GeoPoint, Plate, PlateId, SessionParams};

    fn begin(session: &mut VotingSession) -> juror_session::RequestId {
        match session.handle(Event::Begin).as_slice() {
            [Effect::FetchPlate { request, .. }] => *request,
            other => panic!("unexpected effects {other:?}"),
        }
    }

    #[test]
    fn loading_then_id_prompt() {
        let mut session = VotingSession::new(PlateId(7), SessionParams::circuit_defaults());
        let request = begin(&mut session);
        assert!(render(&session).contains("Loading plate"));

        session.handle(Event::PlateLoaded {
            request,
            result: Ok(Plate {
                id: PlateId(7),
                name: "Moqueca".into(),
                restaurant: "Casa do Mar".into(),
                category: "Seafood".into(),
                photo_url: String::new(),
                location: GeoPoint::new(-23.55, -46.63),
            }),
        });
        let screen = render(&session);
        assert!(screen.starts_with("== Moqueca @ Casa do Mar (Seafood) =="));
        assert!(screen.contains("national ID"));
    }

    #[test]
    fn failed_lookup_shows_notice_and_retry() {
        let mut session = VotingSession::new(PlateId(7), SessionParams::circuit_defaults());
        let request = begin(&mut session);
        session.handle(Event::PlateLoaded {
            request,
            result: Err(GatewayError::Status(503)),
        });
        let screen = render(&session);
        assert!(screen.starts_with("== plate #7 =="));
        assert!(screen.contains("retry"));
        assert!(screen.contains("\n! "));
    }
}
