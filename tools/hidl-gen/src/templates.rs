// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 hidl-gen contributors

//! File skeletons. Per-type bodies come from the emitters; these only add
//! banners, includes and namespace wrapping.

pub const NATIVE_HEADER: &str = r#"// Generated by hidl-gen {{ version }} from {{ source }}. Do not edit.
#ifndef {{ guard }}
#define {{ guard }}

#include <hidl/HidlSupport.h>
#include <hidl/MQDescriptor.h>
#include <hidl/Status.h>
#include <utils/NativeHandle.h>
#include <utils/misc.h>
#include <functional>
#include <string>

{% for ns in namespaces %}namespace {{ ns }} {
{% endfor %}
{% for decl in forward_declarations %}{{ decl }}
{% endfor %}
{% for decl in declarations %}
{{ decl }}{% endfor %}
{% for def in inline_definitions %}
{{ def }}{% endfor %}
{% for ns in namespaces | reverse %}}  // namespace {{ ns }}
{% endfor %}
#endif  // {{ guard }}
"#;

pub const NATIVE_SOURCE: &str = r#"// Generated by hidl-gen {{ version }} from {{ source }}. Do not edit.
#include "{{ header }}"

#include <hidl/HidlBinderSupport.h>
#include <hidl/HidlTransportSupport.h>

{% for ns in namespaces %}namespace {{ ns }} {
{% endfor %}{% for def in definitions %}
{{ def }}{% endfor %}
{% for ns in namespaces | reverse %}}  // namespace {{ ns }}
{% endfor %}"#;

pub const MANAGED_CLASS: &str = r#"// Generated by hidl-gen {{ version }} from {{ source }}. Do not edit.
package {{ java_package }};

{{ body }}"#;

pub const DESCRIPTOR: &str = r#"# Generated by hidl-gen {{ version }} from {{ source }}. Do not edit.
component_class: HAL_HIDL
component_type_version_major: {{ major }}
component_type_version_minor: {{ minor }}
component_name: "types"

package: "{{ package }}"

{% for attr in attributes %}{{ attr }}
{% endfor %}"#;
