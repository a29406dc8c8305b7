//! Script injection
//!
//! Runs a snippet inside the monitored document through a `<script>`
//! carrier that swallows the snippet's errors and removes itself. The
//! carrier bears [`SCRIPT_ID`], which the monitor never reports.

use fos_dom::{Document, DomError};

/// Reserved `id` of injected script carriers
pub const SCRIPT_ID: &str = "fos-cosmetic-script";

/// Error raised by a [`ScriptHost`] while evaluating a script
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScriptError {
    #[error("script evaluation failed: {0}")]
    Evaluation(String),
    #[error("scripting is disabled")]
    Disabled,
}

/// Injection setup failure
#[derive(Debug, thiserror::Error)]
pub enum InjectError {
    #[error("document has neither <head> nor a document element")]
    NoInsertionPoint,
    #[error(transparent)]
    Dom(#[from] DomError),
}

/// Executes script source in the document's environment
pub trait ScriptHost {
    fn evaluate(&mut self, source: &str) -> Result<(), ScriptError>;
}

/// Wrap `snippet` so runtime errors are caught and the executing carrier
/// removes itself afterwards.
pub fn auto_remove_script(snippet: &str) -> String {
    format!(
        "try {{ {snippet} }} catch (ex) {{ }}
(function() {{
  var currentScript = document.currentScript;
  var parent = currentScript && currentScript.parentNode;
  if (parent) {{
    parent.removeChild(currentScript);
  }}
}})();"
    )
}

/// Inject `snippet` with the default [`SCRIPT_ID`]
pub fn inject_script<H>(document: &mut Document, snippet: &str, host: &mut H) -> Result<(), InjectError>
where
    H: ScriptHost + ?Sized,
{
    inject_script_with_id(document, snippet, SCRIPT_ID, host)
}

/// Insert a self-removing carrier for `snippet` into `<head>` (or the
/// document element), evaluate it, then detach the carrier.
///
/// Errors from the snippet are discarded; only a missing insertion point
/// or a tree error is reported.
pub fn inject_script_with_id<H>(
    document: &mut Document,
    snippet: &str,
    script_id: &str,
    host: &mut H,
) -> Result<(), InjectError>
where
    H: ScriptHost + ?Sized,
{
    let parent = document
        .head()
        .or_else(|| document.document_element())
        .ok_or(InjectError::NoInsertionPoint)?;

    let source = auto_remove_script(snippet);
    let tree = document.tree_mut();

    // Built detached, so only the final insertion is observable
    let script = tree.create_element("script");
    tree.set_attribute(script, "type", "text/javascript")?;
    tree.set_attribute(script, "id", script_id)?;
    let text = tree.create_text(&source);
    tree.append_child(script, text)?;
    tree.append_child(parent, script)?;

    if let Err(err) = host.evaluate(&source) {
        tracing::debug!(%err, "injected script failed");
    }

    tree.remove(script)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct RecordingHost {
        sources: Vec<String>,
        fail: bool,
    }

    impl ScriptHost for RecordingHost {
        fn evaluate(&mut self, source: &str) -> Result<(), ScriptError> {
            self.sources.push(source.to_string());
            if self.fail {
                Err(ScriptError::Evaluation("ReferenceError: x is not defined".into()))
            } else {
                Ok(())
            }
        }
    }

    #[test]
    fn test_wrapper_shape() {
        let wrapped = auto_remove_script("window.x = 1;");
        assert!(wrapped.starts_with("try { window.x = 1; } catch (ex) { }"));
        assert!(wrapped.contains("parent.removeChild(currentScript);"));
    }

    #[test]
    fn test_carrier_is_removed_after_evaluation() {
        let mut doc = Document::default();
        let head = doc.head().unwrap();
        let mut host = RecordingHost::default();

        inject_script(&mut doc, "x()", &mut host).unwrap();

        assert_eq!(host.sources.len(), 1);
        assert!(host.sources[0].contains("x()"));
        assert_eq!(doc.tree().children(head).count(), 0);
        assert!(doc.get_element_by_id(SCRIPT_ID).is_none());
    }

    #[test]
    fn test_snippet_errors_are_swallowed() {
        let mut doc = Document::default();
        let mut host = RecordingHost {
            fail: true,
            ..Default::default()
        };
        assert!(inject_script(&mut doc, "x()", &mut host).is_ok());
    }

    #[test]
    fn test_disabled_scripting_is_swallowed() {
        struct DisabledHost;

        impl ScriptHost for DisabledHost {
            fn evaluate(&mut self, _source: &str) -> Result<(), ScriptError> {
                Err(ScriptError::Disabled)
            }
        }

        let mut doc = Document::default();
        assert!(inject_script(&mut doc, "x()", &mut DisabledHost).is_ok());
        assert!(doc.get_element_by_id(SCRIPT_ID).is_none());
    }

    #[test]
    fn test_falls_back_to_document_element() {
        let mut doc = Document::default();
        let head = doc.head().unwrap();
        doc.tree_mut().remove(head).unwrap();
        let mut host = RecordingHost::default();

        inject_script(&mut doc, "1", &mut host).unwrap();
        assert_eq!(host.sources.len(), 1);
    }

    #[test]
    fn test_no_insertion_point() {
        let mut doc = Document::empty("about:blank");
        let mut host = RecordingHost::default();
        let err = inject_script(&mut doc, "1", &mut host).unwrap_err();
        assert!(matches!(err, InjectError::NoInsertionPoint));
        assert!(host.sources.is_empty());
    }
}
