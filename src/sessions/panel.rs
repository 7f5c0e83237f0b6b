//! Task-creation panel and its date/time modals.

use chrono::Local;

use crate::gateway::{ComponentEvent, Control, ModalSpec, ModalSubmitEvent, RenderedMessage};
use crate::sessions::view::{View, ViewAction};
use crate::tasks::{RemindType, TaskDraft};
use crate::timeparse;

/// Modal id for the date input.
pub const DATE_MODAL_ID: &str = "task_date";
/// Modal id for the time input.
pub const TIME_MODAL_ID: &str = "task_time";

const ADD_DATE: &str = "add_date";
const ADD_TIME: &str = "add_time";
const FINISH: &str = "finish";
const CANCEL: &str = "cancel";
const REMIND: &str = "remind";

const NOT_SET: &str = "Not Set";
const PAST_ERROR: &str = "You can't set a task to be in the past!";

/// Panel accumulating a [`TaskDraft`] before submission.
///
/// The date and time buttons open modals whose submissions come back
/// through [`View::handle_modal`]; the reminder select stores its choice
/// directly. Finish validates the accumulated draft and emits the single
/// terminal submission.
pub struct TaskPanel {
    draft: TaskDraft,
    stopped: bool,
}

impl TaskPanel {
    pub fn new(text: impl Into<String>) -> Self {
        TaskPanel {
            draft: TaskDraft::new(text),
            stopped: false,
        }
    }

    pub fn draft(&self) -> &TaskDraft {
        &self.draft
    }

    fn finish(&mut self) -> ViewAction {
        let mut draft = self.draft.clone();
        let now = Local::now().naive_local();

        // A time without a date means today, which must still be ahead.
        if let (Some(time), None) = (draft.time, draft.date) {
            let today = now.date();
            if today.and_time(time) <= now {
                return ViewAction::Reject(PAST_ERROR.to_string());
            }
            draft.date = Some(today);
        }

        ViewAction::Submit(draft)
    }

    fn set_date(&mut self, input: &str) -> ViewAction {
        let now = Local::now().naive_local();
        let date = match timeparse::parse_date(input, now.date()) {
            Ok(date) => date,
            Err(e) => return ViewAction::Reject(format!("{e}")),
        };

        if let Some(time) = self.draft.time
            && date.and_time(time) <= now
        {
            return ViewAction::Reject(PAST_ERROR.to_string());
        }
        if date < now.date() {
            return ViewAction::Reject(PAST_ERROR.to_string());
        }

        self.draft.date = Some(date);
        ViewAction::Render
    }

    fn set_time(&mut self, input: &str) -> ViewAction {
        let now = Local::now().naive_local();
        let time = match timeparse::parse_time(input) {
            Ok(time) => time,
            Err(e) => return ViewAction::Reject(format!("{e}")),
        };

        if let Some(date) = self.draft.date
            && date.and_time(time) <= now
        {
            return ViewAction::Reject(PAST_ERROR.to_string());
        }

        self.draft.time = Some(time);
        ViewAction::Render
    }
}

impl View for TaskPanel {
    fn render(&self) -> RenderedMessage {
        let date = self
            .draft
            .date
            .map(|d| d.format("%B %d, %Y").to_string())
            .unwrap_or_else(|| NOT_SET.to_string());
        let time = self
            .draft
            .time
            .map(|t| t.format("%I:%M %p").to_string())
            .unwrap_or_else(|| NOT_SET.to_string());

        let mut controls = vec![
            Control::button(ADD_DATE, "Add Date"),
            Control::button(ADD_TIME, "Add Time"),
            Control::button(FINISH, "Finish"),
            Control::button(CANCEL, "Cancel"),
            Control::select(
                REMIND,
                "Remind type",
                vec![
                    RemindType::ChannelMention.label().to_string(),
                    RemindType::DirectMessage.label().to_string(),
                    RemindType::None.label().to_string(),
                ],
            ),
        ];
        if self.stopped {
            controls = controls.into_iter().map(Control::disable).collect();
        }

        RenderedMessage {
            body: format!(
                "\u{1F4DD} Creating Task...\n{}\nDate: {date}\nTime: {time}\nRemind Type: {}",
                self.draft.text,
                self.draft.remind_type.label()
            ),
            controls,
        }
    }

    fn handle(&mut self, event: &ComponentEvent) -> ViewAction {
        if self.stopped {
            return ViewAction::None;
        }
        match event.control_id.as_str() {
            ADD_DATE => ViewAction::OpenModal(ModalSpec {
                id: DATE_MODAL_ID.to_string(),
                title: "Add task date".to_string(),
                label: "Date".to_string(),
                placeholder: "October 20 ... 20/10/2021 ... 20-10-2021 ... 20.10.2021 \
                              ... tomorrow ... next week"
                    .to_string(),
            }),
            ADD_TIME => ViewAction::OpenModal(ModalSpec {
                id: TIME_MODAL_ID.to_string(),
                title: "Add task time".to_string(),
                label: "Time".to_string(),
                placeholder: "10:00 AM ... 10:00 PM ... 10:00 ... 10:00:00".to_string(),
            }),
            REMIND => match event.value.as_deref().and_then(RemindType::from_label) {
                Some(remind_type) => {
                    self.draft.remind_type = remind_type;
                    ViewAction::Render
                }
                None => ViewAction::None,
            },
            FINISH => self.finish(),
            CANCEL => {
                self.stopped = true;
                ViewAction::Stop
            }
            _ => ViewAction::None,
        }
    }

    fn handle_modal(&mut self, event: &ModalSubmitEvent) -> ViewAction {
        if self.stopped {
            return ViewAction::None;
        }
        match event.modal_id.as_str() {
            DATE_MODAL_ID => self.set_date(&event.value),
            TIME_MODAL_ID => self.set_time(&event.value),
            _ => ViewAction::None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn press(panel: &mut TaskPanel, control_id: &str, value: Option<&str>) -> ViewAction {
        panel.handle(&ComponentEvent {
            channel_id: "chan".to_string(),
            message_id: "m1".to_string(),
            user_id: 1,
            control_id: control_id.to_string(),
            value: value.map(str::to_string),
        })
    }

    fn submit_modal(panel: &mut TaskPanel, modal_id: &str, value: &str) -> ViewAction {
        panel.handle_modal(&ModalSubmitEvent {
            channel_id: "chan".to_string(),
            message_id: "m1".to_string(),
            user_id: 1,
            modal_id: modal_id.to_string(),
            value: value.to_string(),
        })
    }

    #[test]
    fn test_render_shows_unset_fields() {
        let panel = TaskPanel::new("buy milk");
        let rendered = panel.render();
        assert!(rendered.body.contains("buy milk"));
        assert!(rendered.body.contains("Date: Not Set"));
        assert!(rendered.body.contains("Time: Not Set"));
        assert!(rendered.body.contains("Remind Type: None"));
    }

    #[test]
    fn test_date_button_opens_date_modal() {
        let mut panel = TaskPanel::new("buy milk");
        let action = press(&mut panel, "add_date", None);
        match action {
            ViewAction::OpenModal(spec) => assert_eq!(spec.id, DATE_MODAL_ID),
            other => panic!("expected modal, got {other:?}"),
        }
    }

    #[test]
    fn test_date_modal_sets_future_date() {
        let mut panel = TaskPanel::new("buy milk");
        let tomorrow = Local::now().date_naive() + Duration::days(1);
        let action = submit_modal(&mut panel, DATE_MODAL_ID, "tomorrow");
        assert!(matches!(action, ViewAction::Render));
        assert_eq!(panel.draft().date, Some(tomorrow));
    }

    #[test]
    fn test_date_modal_rejects_past_date() {
        let mut panel = TaskPanel::new("buy milk");
        let yesterday = Local::now().date_naive() - Duration::days(1);
        let action = submit_modal(
            &mut panel,
            DATE_MODAL_ID,
            &yesterday.format("%d/%m/%Y").to_string(),
        );
        assert!(matches!(action, ViewAction::Reject(_)));
        assert_eq!(panel.draft().date, None);
    }

    #[test]
    fn test_date_modal_rejects_garbage() {
        let mut panel = TaskPanel::new("buy milk");
        let action = submit_modal(&mut panel, DATE_MODAL_ID, "whenever I feel like it");
        assert!(matches!(action, ViewAction::Reject(_)));
    }

    #[test]
    fn test_time_modal_sets_time() {
        let mut panel = TaskPanel::new("buy milk");
        // A bare time stays unanchored until finish, so no past check yet.
        let action = submit_modal(&mut panel, TIME_MODAL_ID, "10:30 PM");
        assert!(matches!(action, ViewAction::Render));
        assert_eq!(
            panel.draft().time,
            Some(chrono::NaiveTime::from_hms_opt(22, 30, 0).unwrap())
        );
    }

    #[test]
    fn test_remind_select_updates_draft() {
        let mut panel = TaskPanel::new("buy milk");
        let action = press(&mut panel, "remind", Some("Direct Message"));
        assert!(matches!(action, ViewAction::Render));
        assert_eq!(panel.draft().remind_type, RemindType::DirectMessage);

        let action = press(&mut panel, "remind", Some("Carrier Pigeon"));
        assert!(matches!(action, ViewAction::None));
        assert_eq!(panel.draft().remind_type, RemindType::DirectMessage);
    }

    #[test]
    fn test_finish_without_datetime_submits() {
        let mut panel = TaskPanel::new("buy milk");
        let action = press(&mut panel, "finish", None);
        match action {
            ViewAction::Submit(draft) => {
                assert_eq!(draft.text, "buy milk");
                assert_eq!(draft.date, None);
                assert_eq!(draft.time, None);
            }
            other => panic!("expected submit, got {other:?}"),
        }
    }

    #[test]
    fn test_finish_with_future_date_submits() {
        let mut panel = TaskPanel::new("buy milk");
        submit_modal(&mut panel, DATE_MODAL_ID, "next week");
        let action = press(&mut panel, "finish", None);
        assert!(matches!(action, ViewAction::Submit(_)));
    }

    #[test]
    fn test_finish_anchors_bare_time_to_today() {
        let mut panel = TaskPanel::new("buy milk");
        // One minute from now: submitting should anchor the date to today.
        let soon = Local::now().naive_local() + Duration::minutes(1);
        submit_modal(
            &mut panel,
            TIME_MODAL_ID,
            &soon.time().format("%H:%M:%S").to_string(),
        );

        let action = press(&mut panel, "finish", None);
        match action {
            ViewAction::Submit(draft) => {
                assert_eq!(draft.date, Some(soon.date()));
            }
            other => panic!("expected submit, got {other:?}"),
        }
    }

    #[test]
    fn test_finish_rejects_bare_time_already_past() {
        let mut panel = TaskPanel::new("buy milk");
        let earlier = Local::now().naive_local() - Duration::minutes(5);
        submit_modal(
            &mut panel,
            TIME_MODAL_ID,
            &earlier.time().format("%H:%M:%S").to_string(),
        );

        let action = press(&mut panel, "finish", None);
        assert!(matches!(action, ViewAction::Reject(_)));
    }

    #[test]
    fn test_cancel_stops_and_disables() {
        let mut panel = TaskPanel::new("buy milk");
        let action = press(&mut panel, "cancel", None);
        assert!(matches!(action, ViewAction::Stop));
        assert!(panel.render().controls.iter().all(|c| c.disabled));

        let action = press(&mut panel, "finish", None);
        assert!(matches!(action, ViewAction::None));
    }
}
