//! Juror commands typed at the kiosk prompt.

use juror_session::Event;
use thiserror::Error;

pub const HELP: &str = "\
commands:
  id <number>        national ID            phone <number>   phone number
  code <digits>      type code digits       erase            delete last digit
  resend             send a new code        back             previous step
  confirm            vote for this plate    retry            start over after an error
  camera             retry the camera       flip             switch front/back camera
  capture            take the photo         retake           discard the photo
  use                send photo for review  relocate         retry location
  score <1.0-5.0>    set current score      + / -            nudge score by 0.1
  comment [text]     optional comment       next             next screen
  submit             send the vote          quit             leave the session";

/// What one input line asks for.
#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    Event(Event),
    Help,
    Nothing,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("unknown command {0:?} (type \"help\")")]
    Unknown(String),

    #[error("{0} needs a value")]
    MissingArgument(&'static str),

    #[error("{0:?} is not a number")]
    NotANumber(String),
}

pub fn parse(line: &str) -> Result<Input, CommandError> {
    let line = line.trim();
    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (line, ""),
    };

    let event = match verb.to_ascii_lowercase().as_str() {
        "" => return Ok(Input::Nothing),
        "help" | "?" => return Ok(Input::Help),
        "id" => Event::SubmitNationalId(required("id", rest)?.to_string()),
        "phone" => Event::SubmitPhone(required("phone", rest)?.to_string()),
        "code" | "digit" => Event::EnterDigits(required("code", rest)?.to_string()),
        "erase" => Event::EraseDigit,
        "resend" => Event::ResendCode,
        "back" | "prev" => Event::Back,
        "confirm" => Event::ConfirmPlate,
        "retry" => Event::Retry,
        "camera" => Event::RetryCamera,
        "flip" => Event::SwitchFacing,
        "capture" => Event::CapturePhoto,
        "retake" => Event::Retake,
        "use" => Event::UsePhoto,
        "relocate" => Event::RetryLocation,
        "score" => {
            let raw = required("score", rest)?;
            let value = raw
                .replace(',', ".")
                .parse()
                .map_err(|_| CommandError::NotANumber(raw.to_string()))?;
            Event::SetScore(value)
        }
        "+" => Event::AdjustScore(1),
        "-" => Event::AdjustScore(-1),
        "comment" => Event::SetComment(rest.to_string()),
        "next" => Event::Next,
        "submit" => Event::Submit,
        "quit" | "exit" => Event::Abandon,
        other => return Err(CommandError::Unknown(other.to_string())),
    };
    Ok(Input::Event(event))
}

fn required<'a>(name: &'static str, rest: &'a str) -> Result<&'a str, CommandError> {
    if rest.is_empty() {
        Err(CommandError::MissingArgument(name))
    } else {
        Ok(rest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(line: &str) -> Event {
        match parse(line) {
            Ok(Input::Event(event)) => event,
            other => panic!("{line:?} parsed as {other:?}"),
        }
    }

    #[test]
    fn values_keep_their_formatting() {
        assert_eq!(
            event("id 529.982.247-25"),
            Event::SubmitNationalId("529.982.247-25".into())
        );
        assert_eq!(
            event("phone (11) 99999-8888"),
            Event::SubmitPhone("(11) 99999-8888".into())
        );
        assert_eq!(event("  CODE 1234 "), Event::EnterDigits("1234".into()));
    }

    #[test]
    fn scores_accept_decimal_comma() {
        assert_eq!(event("score 4.5"), Event::SetScore(4.5));
        assert_eq!(event("score 3,7"), Event::SetScore(3.7));
        assert_eq!(event("+"), Event::AdjustScore(1));
        assert_eq!(event("-"), Event::AdjustScore(-1));
        assert_eq!(
            parse("score lots"),
            Err(CommandError::NotANumber("lots".into()))
        );
    }

    #[test]
    fn comment_may_be_cleared() {
        assert_eq!(
            event("comment great  crust"),
            Event::SetComment("great  crust".into())
        );
        assert_eq!(event("comment"), Event::SetComment(String::new()));
    }

    #[test]
    fn bare_actions() {
        assert_eq!(event("quit"), Event::Abandon);
        assert_eq!(event("use"), Event::UsePhoto);
        assert_eq!(event("relocate"), Event::RetryLocation);
        assert_eq!(parse("   "), Ok(Input::Nothing));
        assert_eq!(parse("?"), Ok(Input::Help));
    }

    #[test]
    fn errors_name_the_problem() {
        assert_eq!(parse("phone"), Err(CommandError::MissingArgument("phone")));
        assert_eq!(parse("dance"), Err(CommandError::Unknown("dance".into())));
    }
}
