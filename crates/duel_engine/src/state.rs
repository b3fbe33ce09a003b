//! Observable game state.
//!
//! Every property compares old and new value and notifies subscribers only
//! on inequality. Changes are also queued for the next `DuelUpdate`.

use std::fmt;

use contracts::{
    GameStateSnapshot, ImageSourceInfo, PlayerSlot, Property, PropertyChange, PropertyValue,
    StatusColor,
};

/// Callback invoked for every property change
pub type ChangeSubscriber = Box<dyn FnMut(&PropertyChange) + Send>;

/// Conversion of a property value into its wire form
trait ObservableValue: PartialEq + Clone {
    fn to_value(&self) -> PropertyValue;
}

impl ObservableValue for i32 {
    fn to_value(&self) -> PropertyValue {
        PropertyValue::Integer(i64::from(*self))
    }
}

impl ObservableValue for u32 {
    fn to_value(&self) -> PropertyValue {
        PropertyValue::Integer(i64::from(*self))
    }
}

impl ObservableValue for bool {
    fn to_value(&self) -> PropertyValue {
        PropertyValue::Flag(*self)
    }
}

impl ObservableValue for String {
    fn to_value(&self) -> PropertyValue {
        PropertyValue::Text(self.clone())
    }
}

impl ObservableValue for StatusColor {
    fn to_value(&self) -> PropertyValue {
        PropertyValue::Color(*self)
    }
}

impl ObservableValue for ImageSourceInfo {
    fn to_value(&self) -> PropertyValue {
        PropertyValue::Image(*self)
    }
}

#[derive(Default)]
struct Notifier {
    subscribers: Vec<ChangeSubscriber>,
    pending: Vec<PropertyChange>,
}

impl Notifier {
    fn notify(&mut self, change: PropertyChange) {
        for subscriber in self.subscribers.iter_mut() {
            subscriber(&change);
        }
        self.pending.push(change);
    }
}

#[derive(Debug, Clone)]
struct Observable<T> {
    property: Property,
    value: T,
}

impl<T: ObservableValue> Observable<T> {
    fn new(property: Property, value: T) -> Self {
        Self { property, value }
    }

    fn set(&mut self, value: T, notifier: &mut Notifier) -> bool {
        if self.value == value {
            return false;
        }
        self.value = value;
        notifier.notify(PropertyChange {
            property: self.property,
            value: self.value.to_value(),
        });
        true
    }
}

/// Bindable duel state
pub struct ObservableState {
    strength: [Observable<i32>; 2],
    wins: [Observable<u32>; 2],
    game_mode: Observable<bool>,
    hulk_mode: Observable<bool>,
    message: Observable<String>,
    message_color: Observable<StatusColor>,
    image_source: Option<Observable<ImageSourceInfo>>,
    notifier: Notifier,
}

impl fmt::Debug for ObservableState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObservableState")
            .field("snapshot", &self.snapshot())
            .field("subscribers", &self.notifier.subscribers.len())
            .field("pending", &self.notifier.pending.len())
            .finish()
    }
}

impl ObservableState {
    /// Initial state; nothing is notified for the starting values
    pub fn new(starting_strength: i32) -> Self {
        Self {
            strength: [
                Observable::new(Property::Player1Strength, starting_strength),
                Observable::new(Property::Player2Strength, starting_strength),
            ],
            wins: [
                Observable::new(Property::Player1Wins, 0),
                Observable::new(Property::Player2Wins, 0),
            ],
            game_mode: Observable::new(Property::GameMode, false),
            hulk_mode: Observable::new(Property::HulkMode, false),
            message: Observable::new(Property::Message, String::new()),
            message_color: Observable::new(Property::MessageColor, StatusColor::Default),
            image_source: None,
            notifier: Notifier::default(),
        }
    }

    pub fn subscribe(&mut self, subscriber: ChangeSubscriber) {
        self.notifier.subscribers.push(subscriber);
    }

    /// Changes queued since the last call, in order
    pub fn take_changes(&mut self) -> Vec<PropertyChange> {
        std::mem::take(&mut self.notifier.pending)
    }

    pub fn strength(&self, player: PlayerSlot) -> i32 {
        self.strength[player.index()].value
    }

    pub fn set_strength(&mut self, player: PlayerSlot, value: i32) -> bool {
        self.strength[player.index()].set(value, &mut self.notifier)
    }

    pub fn wins(&self, player: PlayerSlot) -> u32 {
        self.wins[player.index()].value
    }

    pub fn set_wins(&mut self, player: PlayerSlot, value: u32) -> bool {
        self.wins[player.index()].set(value, &mut self.notifier)
    }

    pub fn game_mode(&self) -> bool {
        self.game_mode.value
    }

    pub fn set_game_mode(&mut self, value: bool) -> bool {
        self.game_mode.set(value, &mut self.notifier)
    }

    pub fn hulk_mode(&self) -> bool {
        self.hulk_mode.value
    }

    pub fn set_hulk_mode(&mut self, value: bool) -> bool {
        self.hulk_mode.set(value, &mut self.notifier)
    }

    pub fn message(&self) -> &str {
        &self.message.value
    }

    pub fn set_message(&mut self, value: impl Into<String>) -> bool {
        self.message.set(value.into(), &mut self.notifier)
    }

    pub fn message_color(&self) -> StatusColor {
        self.message_color.value
    }

    pub fn set_message_color(&mut self, value: StatusColor) -> bool {
        self.message_color.set(value, &mut self.notifier)
    }

    pub fn image_source(&self) -> Option<ImageSourceInfo> {
        self.image_source.as_ref().map(|image| image.value)
    }

    pub fn set_image_source(&mut self, value: ImageSourceInfo) -> bool {
        match self.image_source.as_mut() {
            Some(image) => image.set(value, &mut self.notifier),
            None => {
                // first image always notifies
                self.image_source = Some(Observable::new(Property::ImageSource, value));
                self.notifier.notify(PropertyChange {
                    property: Property::ImageSource,
                    value: value.to_value(),
                });
                true
            }
        }
    }

    pub fn snapshot(&self) -> GameStateSnapshot {
        GameStateSnapshot {
            player1_strength: self.strength(PlayerSlot::One),
            player2_strength: self.strength(PlayerSlot::Two),
            player1_wins: self.wins(PlayerSlot::One),
            player2_wins: self.wins(PlayerSlot::Two),
            game_mode: self.game_mode(),
            hulk_mode: self.hulk_mode(),
            message: self.message().to_string(),
            message_color: self.message_color(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn unchanged_value_is_not_notified() {
        let mut state = ObservableState::new(5);
        assert!(!state.set_strength(PlayerSlot::One, 5));
        assert!(!state.set_game_mode(false));
        assert!(state.take_changes().is_empty());
    }

    #[test]
    fn changes_are_queued_in_order() {
        let mut state = ObservableState::new(5);
        state.set_strength(PlayerSlot::Two, 4);
        state.set_game_mode(true);
        state.set_game_mode(true);
        state.set_message("Kinect connected");

        let changes = state.take_changes();
        let properties: Vec<Property> = changes.iter().map(|c| c.property).collect();
        assert_eq!(
            properties,
            vec![Property::Player2Strength, Property::GameMode, Property::Message]
        );
        assert_eq!(changes[0].value, PropertyValue::Integer(4));
        assert!(state.take_changes().is_empty());
    }

    #[test]
    fn subscribers_see_every_change() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();

        let mut state = ObservableState::new(5);
        state.subscribe(Box::new(move |change| {
            sink.lock().unwrap().push(change.property);
        }));

        state.set_hulk_mode(true);
        state.set_hulk_mode(true);
        state.set_message_color(StatusColor::Red);

        assert_eq!(
            *seen.lock().unwrap(),
            vec![Property::HulkMode, Property::MessageColor]
        );
    }

    #[test]
    fn image_source_notifies_per_new_frame() {
        let mut state = ObservableState::new(5);
        let image = ImageSourceInfo {
            frame_number: 1,
            width: 640,
            height: 480,
        };
        assert!(state.set_image_source(image));
        assert!(!state.set_image_source(image));
        assert!(state.set_image_source(ImageSourceInfo {
            frame_number: 2,
            ..image
        }));
        assert_eq!(state.image_source().map(|i| i.frame_number), Some(2));
    }

    #[test]
    fn snapshot_reflects_values() {
        let mut state = ObservableState::new(5);
        state.set_wins(PlayerSlot::One, 2);
        let snapshot = state.snapshot();
        assert_eq!(snapshot.wins(PlayerSlot::One), 2);
        assert_eq!(snapshot.strength(PlayerSlot::Two), 5);
        assert_eq!(snapshot.message_color, StatusColor::Default);
    }
}
