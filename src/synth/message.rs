#[cfg(feature = "rtrb")]
use rtrb::Consumer;

/// Control messages from the UI thread to a [`VoiceBank`](super::bank::VoiceBank).
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum VoiceMessage {
    /// Press a key: start voice `voice` for `duration` seconds, or stop it if
    /// it is already sounding.
    Toggle { voice: usize, duration: f64 },
    /// Stop every sounding voice.
    StopAll,
}

pub trait MessageReceiver {
    fn pop(&mut self) -> Option<VoiceMessage>;
}

#[cfg(feature = "rtrb")]
impl MessageReceiver for Consumer<VoiceMessage> {
    fn pop(&mut self) -> Option<VoiceMessage> {
        Consumer::pop(self).ok()
    }
}

/// Messages queued in memory; for driving a bank without a ring buffer.
impl MessageReceiver for std::collections::VecDeque<VoiceMessage> {
    fn pop(&mut self) -> Option<VoiceMessage> {
        self.pop_front()
    }
}
