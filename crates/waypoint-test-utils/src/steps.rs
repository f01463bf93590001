/// Steps shared by the test suites
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TestStep {
    /// First step of a flow
    Start,
    /// Move on within the same flow
    Next,
    /// Open a nested flow
    Child,
    /// Handed to the parent when a nested flow is over
    Done,
    /// Handed to the parent while the nested flow keeps running
    Notify,
    /// A step carrying data
    Item(u32),
}
