/// Cancellation token for a scheduled task.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskToken(u64);

#[derive(Clone, Debug)]
struct Task<K> {
    token: TaskToken,
    due_ms: f64,
    period_ms: Option<f64>,
    kind: K,
}

/// One-shot and repeating timers driven by an external clock.
///
/// Nothing fires on its own: the owner calls [`Scheduler::due`] from its
/// tick and acts on the returned kinds. A repeating task fires at most once
/// per `due` call; ticks missed while the page was throttled are coalesced.
#[derive(Clone, Debug)]
pub struct Scheduler<K> {
    tasks: Vec<Task<K>>,
    next_token: u64,
}

impl<K: Clone> Scheduler<K> {
    pub fn new() -> Self {
        Self {
            tasks: Vec::new(),
            next_token: 1,
        }
    }

    pub fn once(&mut self, now_ms: f64, delay_ms: f64, kind: K) -> TaskToken {
        self.push(now_ms + delay_ms.max(0.0), None, kind)
    }

    pub fn repeating(&mut self, now_ms: f64, period_ms: f64, kind: K) -> TaskToken {
        let period_ms = period_ms.max(1.0);
        self.push(now_ms + period_ms, Some(period_ms), kind)
    }

    pub fn cancel(&mut self, token: TaskToken) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|task| task.token != token);
        self.tasks.len() != before
    }

    pub fn is_pending(&self, token: TaskToken) -> bool {
        self.tasks.iter().any(|task| task.token == token)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn clear(&mut self) {
        self.tasks.clear();
    }

    /// Kinds of every task due at `now_ms`, earliest first.
    pub fn due(&mut self, now_ms: f64) -> Vec<K> {
        let mut fired: Vec<(f64, TaskToken, K)> = Vec::new();
        self.tasks.retain_mut(|task| {
            if task.due_ms > now_ms {
                return true;
            }
            fired.push((task.due_ms, task.token, task.kind.clone()));
            match task.period_ms {
                Some(period) => {
                    while task.due_ms <= now_ms {
                        task.due_ms += period;
                    }
                    true
                }
                None => false,
            }
        });
        fired.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        fired.into_iter().map(|(_, _, kind)| kind).collect()
    }

    fn push(&mut self, due_ms: f64, period_ms: Option<f64>, kind: K) -> TaskToken {
        let token = TaskToken(self.next_token);
        self.next_token = self.next_token.saturating_add(1);
        self.tasks.push(Task {
            token,
            due_ms,
            period_ms,
            kind,
        });
        token
    }
}

impl<K: Clone> Default for Scheduler<K> {
    fn default() -> Self {
        Self::new()
    }
}
