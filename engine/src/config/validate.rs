pub trait Validate {
    fn validate(&self) -> Result<(), String>;

    /// Returns a value that passes [`Validate::validate`], replacing whatever is invalid with
    /// defaults. The default implementation discards the whole value; types with independent
    /// fields override it to repair field by field.
    fn sanitized(self) -> Self
    where
        Self: Sized + Default,
    {
        if self.validate().is_ok() {
            self
        } else {
            Self::default()
        }
    }
}
