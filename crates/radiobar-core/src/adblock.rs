//! Ad filtering for loaded pages
//!
//! Two layers: a blocked-domain list checked against outgoing navigations,
//! and a page script. The script refuses blocked `fetch`/XHR requests and
//! `script`/`iframe` sources before they load, then hides and removes known
//! ad containers, including inside nested shadow roots.

use serde::Serialize;
use tracing::info;

/// Hosts whose requests are cancelled by default
pub const DEFAULT_BLOCKED_DOMAINS: [&str; 2] =
    ["safeframe.googlesyndication.com", "googletagservices.com"];

/// Ad containers removed by default
pub const DEFAULT_AD_SELECTORS: [&str; 1] = [".ad-top-banner"];

/// Substring blocklist for request URLs
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BlockList {
    domains: Vec<String>,
}

impl BlockList {
    pub fn new(domains: impl IntoIterator<Item = String>) -> Self {
        Self {
            domains: domains
                .into_iter()
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty())
                .collect(),
        }
    }

    pub fn domains(&self) -> &[String] {
        &self.domains
    }

    /// Entry matched by `url`, if any. Plain substring match on the full URL.
    pub fn matching(&self, url: &str) -> Option<&str> {
        self.domains
            .iter()
            .find(|d| url.contains(d.as_str()))
            .map(String::as_str)
    }

    /// True when the request must be cancelled. Logs the cancellation.
    pub fn should_block(&self, url: &str) -> bool {
        match self.matching(url) {
            Some(domain) => {
                info!(url, domain, "Blocking request");
                true
            }
            None => false,
        }
    }
}

const STRIPPER_TEMPLATE: &str = r#"(function () {
  if (window.__radiobarAdStripper) return;
  window.__radiobarAdStripper = true;

  const SELECTORS = __SELECTORS__;
  const BLOCKED = __BLOCKED__;
  const CSS = __CSS__;
  const SWEEP_MS = __SWEEP_MS__;
  const QUERY = SELECTORS.join(', ');

  function isBlocked(url) {
    const text = String(url || '');
    return BLOCKED.some((domain) => text.includes(domain));
  }

  // Request guards, installed before any page script runs
  const nativeFetch = window.fetch;
  if (nativeFetch) {
    window.fetch = function (input, init) {
      const url = input && input.url ? input.url : input;
      if (isBlocked(url)) {
        return Promise.reject(new TypeError('Blocked: ' + url));
      }
      return nativeFetch.call(this, input, init);
    };
  }

  const nativeOpen = XMLHttpRequest.prototype.open;
  XMLHttpRequest.prototype.open = function (method, url) {
    if (isBlocked(url)) {
      throw new DOMException('Blocked: ' + url, 'NetworkError');
    }
    return nativeOpen.apply(this, arguments);
  };

  [HTMLScriptElement, HTMLIFrameElement].forEach((type) => {
    const desc = Object.getOwnPropertyDescriptor(type.prototype, 'src');
    if (!desc || !desc.set) return;
    Object.defineProperty(type.prototype, 'src', {
      configurable: true,
      enumerable: desc.enumerable,
      get: desc.get,
      set(value) {
        if (isBlocked(value)) return;
        desc.set.call(this, value);
      },
    });
  });

  const nativeSetAttribute = Element.prototype.setAttribute;
  Element.prototype.setAttribute = function (name, value) {
    const guarded = this instanceof HTMLScriptElement || this instanceof HTMLIFrameElement;
    if (guarded && String(name).toLowerCase() === 'src' && isBlocked(value)) return;
    return nativeSetAttribute.call(this, name, value);
  };

  function collapse(el) {
    const parent = el.parentElement;
    el.remove();
    if (parent && parent.childElementCount === 0) {
      parent.style.display = 'none';
    }
  }

  function blockedSource(el) {
    return isBlocked(el.getAttribute('src'));
  }

  function sweep(root) {
    if (!root) return;
    if (QUERY) root.querySelectorAll(QUERY).forEach(collapse);
    root.querySelectorAll('iframe[src], script[src]').forEach((el) => {
      if (blockedSource(el)) collapse(el);
    });
    root.querySelectorAll('*').forEach((el) => {
      if (el.shadowRoot) sweep(el.shadowRoot);
    });
  }

  function start() {
    if (CSS) {
      const style = document.createElement('style');
      style.textContent = CSS;
      (document.head || document.documentElement).appendChild(style);
    }
    sweep(document);
    const observer = new MutationObserver((mutations) => {
      if (mutations.some((m) => m.type === 'childList' && m.addedNodes.length > 0)) {
        sweep(document);
      }
    });
    observer.observe(document.body || document.documentElement, { childList: true, subtree: true });
    setInterval(() => sweep(document), SWEEP_MS);
  }

  if (document.readyState === 'loading') {
    document.addEventListener('DOMContentLoaded', start);
  } else {
    start();
  }
})();
"#;

/// Generates the page-side ad stripper
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdStripper {
    selectors: Vec<String>,
    blocklist: BlockList,
    sweep_interval_ms: u64,
}

impl Default for AdStripper {
    fn default() -> Self {
        Self::new(
            DEFAULT_AD_SELECTORS.iter().map(|s| s.to_string()).collect(),
            BlockList::new(DEFAULT_BLOCKED_DOMAINS.iter().map(|s| s.to_string())),
        )
    }
}

impl AdStripper {
    pub fn new(selectors: Vec<String>, blocklist: BlockList) -> Self {
        Self {
            selectors,
            blocklist,
            sweep_interval_ms: 1000,
        }
    }

    pub fn with_sweep_interval_ms(mut self, ms: u64) -> Self {
        self.sweep_interval_ms = ms;
        self
    }

    pub fn blocklist(&self) -> &BlockList {
        &self.blocklist
    }

    /// Stylesheet that collapses matched elements before the sweep removes them
    pub fn stylesheet(&self) -> String {
        if self.selectors.is_empty() {
            return String::new();
        }
        format!(
            "{} {{\n  display: none !important;\n  height: 0 !important;\n  margin: 0 !important;\n  padding: 0 !important;\n  overflow: hidden !important;\n}}\n",
            self.selectors.join(",\n")
        )
    }

    /// Initialization script injected into every page load
    pub fn init_script(&self) -> String {
        STRIPPER_TEMPLATE
            .replace("__SELECTORS__", &json_literal(&self.selectors))
            .replace("__BLOCKED__", &json_literal(&self.blocklist.domains))
            .replace("__CSS__", &json_literal(&self.stylesheet()))
            .replace("__SWEEP_MS__", &self.sweep_interval_ms.to_string())
    }
}

/// JSON literal for embedding into the script template
fn json_literal<T: Serialize + ?Sized>(value: &T) -> String {
    // Strings and string vectors always serialize
    serde_json::to_string(value).unwrap_or_else(|_| "null".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_blocklist() {
        let list = BlockList::new(DEFAULT_BLOCKED_DOMAINS.iter().map(|s| s.to_string()));
        assert!(list.should_block(
            "https://tpc.safeframe.googlesyndication.com/safeframe/1-0-40/html/container.html"
        ));
        assert!(list.should_block("https://www.googletagservices.com/tag/js/gpt.js"));
        assert!(!list.should_block("https://dispatcher.rndfnk.com/crtve/rner3/main/mp3/high"));
    }

    #[test]
    fn test_substring_semantics() {
        let list = BlockList::new(vec!["ads.example".to_string()]);
        // Matches anywhere in the URL, including the query string
        assert_eq!(
            list.matching("https://cdn.test/x?ref=ads.example"),
            Some("ads.example")
        );
        assert_eq!(list.matching("https://example.test/"), None);
    }

    #[test]
    fn test_blank_entries_dropped() {
        let list = BlockList::new(vec!["".to_string(), "  ".to_string(), "a.test".to_string()]);
        assert_eq!(list.domains(), ["a.test".to_string()]);
    }

    #[test]
    fn test_stylesheet() {
        let css = AdStripper::default().stylesheet();
        assert!(css.starts_with(".ad-top-banner {"));
        assert!(css.contains("display: none !important;"));
        assert!(css.contains("overflow: hidden !important;"));

        let empty = AdStripper::new(vec![], BlockList::default());
        assert!(empty.stylesheet().is_empty());
    }

    #[test]
    fn test_init_script_embeds_configuration() {
        let script = AdStripper::new(
            vec![".promo".to_string(), "#banner \"x\"".to_string()],
            BlockList::new(vec!["ads.test".to_string()]),
        )
        .with_sweep_interval_ms(2500)
        .init_script();

        assert!(script.contains(r##"const SELECTORS = [".promo","#banner \"x\""];"##));
        assert!(script.contains(r#"const BLOCKED = ["ads.test"];"#));
        assert!(script.contains("const SWEEP_MS = 2500;"));
        assert!(script.contains("el.shadowRoot"));
        assert!(script.contains("MutationObserver"));
        assert!(script.contains("window.fetch = function"));
        assert!(script.contains("XMLHttpRequest.prototype.open"));
        assert!(script.contains("[HTMLScriptElement, HTMLIFrameElement]"));
        // Guards are in place before the DOM is ready
        assert!(script.find("window.fetch = function") < script.find("function start()"));
        assert!(!script.contains("__SELECTORS__"));
        assert!(!script.contains("__CSS__"));
    }
}
