use crate::core::event::EventData;

pub type EventHandler = Box<dyn Fn(&EventData)>;

/// Publish/subscribe capability owned by the host window.
///
/// The locator never creates one; the host hands it over through
/// `ServiceLocator::subscribe_to_events`.
pub trait EventDispatcher {
    fn subscribe_to_event(&self, event_type: &str, handler: EventHandler);
    fn send_event(&self, event_type: &str, data: &EventData);
}
