/// `Err` carries the message shown for a failing case.
pub type TestResult = Result<(), String>;

pub trait TestCase {
    fn name(&self) -> &str;

    /// Fixture directory the case was collected from.
    fn kind(&self) -> &'static str;

    fn execute(&self) -> TestResult;
}
