//! Mail produced by a committed booking.

use bookings_core::dates::{format_date, StayDates};
use bookings_core::forms::GuestDetails;
use bookings_events::MailMessage;

use crate::config::MailSettings;
use crate::render::escape_html;

/// Confirmation sent to the guest.
pub fn guest_confirmation(
    mail: &MailSettings,
    guest: &GuestDetails,
    room_name: &str,
    stay: &StayDates,
) -> MailMessage {
    let body = format!(
        "<strong>Reservation Confirmation</strong><br>\
         Dear {name},<br>\
         This is to confirm your reservation of the {room} from {start} to {end} ({nights} {unit}).",
        name = escape_html(&guest.first_name),
        room = escape_html(room_name),
        start = format_date(stay.start),
        end = format_date(stay.end),
        nights = stay.nights(),
        unit = if stay.nights() == 1 { "night" } else { "nights" },
    );
    MailMessage::new(&guest.email, &mail.from, "Reservation Confirmation", body)
}

/// Notice sent to the property operator.
pub fn operator_notice(
    mail: &MailSettings,
    guest: &GuestDetails,
    room_name: &str,
    stay: &StayDates,
) -> MailMessage {
    let body = format!(
        "<strong>Reservation Notification</strong><br>\
         A reservation has been made for the {room} from {start} to {end} by {name} ({email}).",
        room = escape_html(room_name),
        start = format_date(stay.start),
        end = format_date(stay.end),
        name = escape_html(&guest.full_name()),
        email = escape_html(&guest.email),
    );
    MailMessage::new(&mail.operator_email, &mail.from, "Reservation Notification", body)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::config::ServerConfig;

    #[test]
    fn messages_are_addressed_and_escaped() {
        let config = ServerConfig::default();
        let guest = GuestDetails {
            first_name: "<John>".into(),
            last_name: "Smith".into(),
            email: "john@smith.com".into(),
            phone: "555".into(),
        };
        let stay = StayDates::new(
            NaiveDate::from_ymd_opt(2050, 12, 17).unwrap(),
            NaiveDate::from_ymd_opt(2050, 12, 18).unwrap(),
        )
        .unwrap();

        let guest_mail = guest_confirmation(&config.mail, &guest, "Major's Suite", &stay);
        assert_eq!(guest_mail.to, "john@smith.com");
        assert_eq!(guest_mail.from, config.mail.from);
        assert!(guest_mail.html_body.contains("&lt;John&gt;"));
        assert!(guest_mail.html_body.contains("12-17-2050"));
        assert!(guest_mail.html_body.contains("(1 night)"));

        let operator_mail = operator_notice(&config.mail, &guest, "Major's Suite", &stay);
        assert_eq!(operator_mail.to, config.mail.operator_email);
        assert!(operator_mail.html_body.contains("Major&#39;s Suite"));
    }
}
