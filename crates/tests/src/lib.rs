pub mod fixtures;

#[cfg(test)]
mod event_tests;
#[cfg(test)]
mod gamification_tests;
#[cfg(test)]
mod mission_tests;
#[cfg(test)]
mod notification_tests;
#[cfg(test)]
mod ws_tests;
