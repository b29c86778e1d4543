//! Message builders for each [`MessageKind`].

use serde_json::json;

use super::{MessageKind, OutboundMessage};
use crate::domain::SellerBadge;

/// Base URL used in verification links.
const SIGNUP_URL: &str = "https://trendies.co/signup";

/// Invitation carrying the referral code and verification link.
#[must_use]
pub fn referral_invite(
    inviter_name: &str,
    invitee_email: &str,
    referral_code: &str,
    verification_token: &str,
) -> OutboundMessage {
    let link = format!(
        "{SIGNUP_URL}?ref={referral_code}&email={invitee_email}&token={verification_token}"
    );
    OutboundMessage {
        to: invitee_email.to_string(),
        subject: format!("{inviter_name} invited you to join Trendies - Your code: {referral_code}"),
        html_body: format!(
            "<h2>{inviter_name} invited you to join Trendies!</h2>\
             <p>Your referral code: <b>{referral_code}</b></p>\
             <p><a href=\"{link}\">Join Trendies Now</a></p>\
             <p>This invitation is for {invitee_email}.</p>"
        ),
        text_body: format!(
            "{inviter_name} has invited you to join Trendies.\n\
             Your referral code: {referral_code}\n\
             Join now: {link}"
        ),
        kind: MessageKind::ReferralInvite,
        metadata: Some(json!({
            "inviter_name": inviter_name,
            "referral_code": referral_code,
            "verification_token": verification_token,
        })),
    }
}

/// Confirmation sent to the invitee after verification.
#[must_use]
pub fn referral_verification(invitee_email: &str, referral_code: &str) -> OutboundMessage {
    OutboundMessage {
        to: invitee_email.to_string(),
        subject: format!("Welcome to Trendies! Your referral with code {referral_code} is confirmed"),
        html_body: format!(
            "<h2>Your referral is confirmed</h2>\
             <p>Code <b>{referral_code}</b> has been verified for {invitee_email}.</p>"
        ),
        text_body: format!("Code {referral_code} has been verified for {invitee_email}."),
        kind: MessageKind::ReferralVerification,
        metadata: Some(json!({ "referral_code": referral_code })),
    }
}

/// Notice to the referrer that their invite converted.
#[must_use]
pub fn referral_converted(
    inviter_email: &str,
    inviter_name: &str,
    invitee_email: &str,
    bounty: i64,
) -> OutboundMessage {
    OutboundMessage {
        to: inviter_email.to_string(),
        subject: format!("Success! {invitee_email} joined Trendies - You earned {bounty} points!"),
        html_body: format!(
            "<h2>Congratulations, {inviter_name}!</h2>\
             <p><strong>{invitee_email}</strong> has joined Trendies using your referral code.</p>\
             <p>{bounty} points have been added to your balance.</p>"
        ),
        text_body: format!(
            "Congratulations, {inviter_name}! {invitee_email} joined Trendies. \
             {bounty} points have been added to your balance."
        ),
        kind: MessageKind::ReferralConverted,
        metadata: Some(json!({ "invitee_email": invitee_email, "bounty": bounty })),
    }
}

/// Receipt for a redemption.
#[must_use]
pub fn loyalty_redemption(
    user_email: &str,
    user_name: &str,
    reward_name: &str,
    points_cost: i64,
    remaining_points: i64,
) -> OutboundMessage {
    OutboundMessage {
        to: user_email.to_string(),
        subject: format!("Reward Redeemed: {reward_name} - {remaining_points} points remaining"),
        html_body: format!(
            "<h2>Congratulations, {user_name}!</h2>\
             <p>You've successfully redeemed: <b>{reward_name}</b></p>\
             <p>Points used: {points_cost}<br>Remaining balance: {remaining_points} points</p>\
             <p>Your reward will be processed within 24-48 hours.</p>"
        ),
        text_body: format!(
            "Congratulations, {user_name}!\n\
             You've successfully redeemed: {reward_name}\n\
             Points used: {points_cost}\n\
             Remaining balance: {remaining_points} points"
        ),
        kind: MessageKind::LoyaltyRedemption,
        metadata: Some(json!({
            "reward_name": reward_name,
            "points_cost": points_cost,
            "remaining_points": remaining_points,
        })),
    }
}

/// Notice to a seller that they reached a new badge.
#[must_use]
pub fn badge_upgrade(seller_email: &str, seller_name: &str, badge: SellerBadge) -> OutboundMessage {
    OutboundMessage {
        to: seller_email.to_string(),
        subject: format!("Congratulations! You've been upgraded to {badge:?}"),
        html_body: format!(
            "<h2>Congratulations, {seller_name}!</h2><p>You are now a <b>{badge:?}</b> seller.</p>"
        ),
        text_body: format!("Congratulations, {seller_name}! You are now a {badge:?} seller."),
        kind: MessageKind::BadgeUpgrade,
        metadata: Some(json!({ "badge": badge })),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invite_links_carry_code_and_token() {
        let msg = referral_invite("Stephen", "friend@example.com", "REF-STEPHEN0001", "abc123");
        assert_eq!(msg.to, "friend@example.com");
        assert_eq!(msg.kind, MessageKind::ReferralInvite);
        assert!(msg.html_body.contains("token=abc123"));
        assert!(msg.subject.contains("REF-STEPHEN0001"));
    }

    #[test]
    fn redemption_subject_names_remaining_balance() {
        let msg = loyalty_redemption("s@x.com", "Stephen", "€5 Voucher", 250, 2_150);
        assert_eq!(msg.subject, "Reward Redeemed: €5 Voucher - 2150 points remaining");
        assert_eq!(msg.kind, MessageKind::LoyaltyRedemption);
    }
}
