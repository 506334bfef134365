//! Scripted media primitive

use futures::future::{self, BoxFuture};
use sradio_player::{Error, ItemEvent, ItemEventSink, PlayableAsset, Result, StreamSource};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;
use url::Url;

/// A call made by the engine on the primitive
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Load(Url),
    Attach(Url),
    Detach,
    Play,
    Pause,
    SetVolume(f32),
}

struct FakeState {
    calls: Vec<Call>,
    sink: Option<ItemEventSink>,
    keep_up: bool,
    manual_loads: bool,
    pending: Vec<(Url, oneshot::Sender<Result<PlayableAsset>>)>,
    failing: HashSet<Url>,
}

/// Shared-state fake; clones observe and drive the same primitive
#[derive(Clone)]
pub struct FakeSource {
    state: Arc<Mutex<FakeState>>,
}

impl FakeSource {
    /// Loads resolve immediately; buffer keeps up
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(FakeState {
                calls: Vec::new(),
                sink: None,
                keep_up: true,
                manual_loads: false,
                pending: Vec::new(),
                failing: HashSet::new(),
            })),
        }
    }

    /// Loads stay pending until `complete_load`
    pub fn manual() -> Self {
        let source = Self::new();
        source.state.lock().unwrap().manual_loads = true;
        source
    }

    /// Make loads of `url` fail
    pub fn fail_url(&self, url: &Url) {
        self.state.lock().unwrap().failing.insert(url.clone());
    }

    /// Resolve the oldest pending load for `url`
    pub fn complete_load(&self, url: &Url, result: Result<PlayableAsset>) {
        let mut state = self.state.lock().unwrap();
        let index = state
            .pending
            .iter()
            .position(|(pending, _)| pending == url)
            .expect("no pending load for url");
        let (_, reply) = state.pending.remove(index);
        let _ = reply.send(result);
    }

    pub fn set_keep_up(&self, keep_up: bool) {
        self.state.lock().unwrap().keep_up = keep_up;
    }

    /// Deliver an event through the live item's sink
    pub fn emit(&self, event: ItemEvent) -> bool {
        let sink = self.state.lock().unwrap().sink.clone();
        sink.map(|sink| sink.emit(event)).unwrap_or(false)
    }

    /// The live item's sink, kept to simulate late events
    pub fn sink(&self) -> Option<ItemEventSink> {
        self.state.lock().unwrap().sink.clone()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state.lock().unwrap().calls.clear();
    }

    pub fn count(&self, predicate: impl Fn(&Call) -> bool) -> usize {
        self.calls().iter().filter(|call| predicate(call)).count()
    }

    pub fn attach_count(&self) -> usize {
        self.count(|call| matches!(call, Call::Attach(_)))
    }

    /// Highest number of simultaneously attached items seen
    pub fn max_live_items(&self) -> usize {
        let mut live = 0usize;
        let mut max = 0usize;
        for call in self.calls() {
            match call {
                Call::Attach(_) => live += 1,
                Call::Detach => live = live.saturating_sub(1),
                _ => {}
            }
            max = max.max(live);
        }
        max
    }

    fn record(&self, call: Call) {
        self.state.lock().unwrap().calls.push(call);
    }
}

impl StreamSource for FakeSource {
    fn load(&self, url: &Url) -> BoxFuture<'static, Result<PlayableAsset>> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Load(url.clone()));

        if state.manual_loads {
            let (tx, rx) = oneshot::channel();
            state.pending.push((url.clone(), tx));
            return Box::pin(async move {
                rx.await
                    .unwrap_or_else(|_| Err(Error::Source("load abandoned".to_string())))
            });
        }

        if state.failing.contains(url) {
            return Box::pin(future::ready(Err(Error::AssetUnplayable(url.to_string()))));
        }
        Box::pin(future::ready(Ok(PlayableAsset::new(url.clone()))))
    }

    fn attach(&mut self, asset: &PlayableAsset, events: ItemEventSink) {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Attach(asset.url.clone()));
        state.sink = Some(events);
    }

    fn detach(&mut self) {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Detach);
        state.sink = None;
    }

    fn play(&mut self) {
        self.record(Call::Play);
    }

    fn pause(&mut self) {
        self.record(Call::Pause);
    }

    fn is_likely_to_keep_up(&self) -> bool {
        self.state.lock().unwrap().keep_up
    }

    fn set_volume(&mut self, volume: f32) {
        self.record(Call::SetVolume(volume));
    }
}
