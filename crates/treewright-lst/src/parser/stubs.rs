// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Declarations of the JDK types that attribution resolves against.

/// `(path, source)` pairs parsed and attributed before user sources.
pub const JDK_STUBS: &[(&str, &str)] = &[
    (
        "java/lang/Object.java",
        "package java.lang;
public class Object {
    public Object() {}
    public boolean equals(Object obj);
    public int hashCode();
    public String toString();
    public final Class getClass();
}
",
    ),
    (
        "java/lang/Class.java",
        "package java.lang;
public final class Class<T> {
    public String getName();
}
",
    ),
    (
        "java/lang/CharSequence.java",
        "package java.lang;
public interface CharSequence {
    int length();
    char charAt(int index);
}
",
    ),
    (
        "java/lang/String.java",
        "package java.lang;
public final class String implements CharSequence {
    public String() {}
    public String(String original) {}
    public int length();
    public char charAt(int index);
    public boolean isEmpty();
    public String substring(int beginIndex);
    public String substring(int beginIndex, int endIndex);
    public String trim();
    public String toUpperCase();
    public String toLowerCase();
    public boolean contains(CharSequence s);
    public boolean startsWith(String prefix);
    public String concat(String str);
    public static String valueOf(Object obj);
    public static String format(String format, Object... args);
}
",
    ),
    (
        "java/lang/Integer.java",
        "package java.lang;
public final class Integer {
    public Integer(int value) {}
    public int intValue();
    public static Integer valueOf(int i);
    public static int parseInt(String s);
}
",
    ),
    (
        "java/lang/Iterable.java",
        "package java.lang;
public interface Iterable<T> {
}
",
    ),
    (
        "java/lang/System.java",
        "package java.lang;
import java.io.PrintStream;
public final class System {
    public static PrintStream out;
    public static PrintStream err;
    public static long currentTimeMillis();
    public static String getenv(String name);
    public static String getProperty(String key);
}
",
    ),
    (
        "java/io/PrintStream.java",
        "package java.io;
public class PrintStream {
    public void println(Object x);
    public void println(String x);
    public void print(Object x);
}
",
    ),
    (
        "java/lang/Throwable.java",
        "package java.lang;
public class Throwable {
    public Throwable() {}
    public Throwable(String message) {}
    public String getMessage();
}
",
    ),
    (
        "java/lang/Exception.java",
        "package java.lang;
public class Exception extends Throwable {
    public Exception() {}
    public Exception(String message) {}
}
",
    ),
    (
        "java/lang/RuntimeException.java",
        "package java.lang;
public class RuntimeException extends Exception {
    public RuntimeException() {}
    public RuntimeException(String message) {}
}
",
    ),
    (
        "java/lang/Override.java",
        "package java.lang;
public @interface Override {
}
",
    ),
    (
        "java/lang/Deprecated.java",
        "package java.lang;
public @interface Deprecated {
    String since();
    boolean forRemoval();
}
",
    ),
    (
        "java/lang/SuppressWarnings.java",
        "package java.lang;
public @interface SuppressWarnings {
    String value();
}
",
    ),
    (
        "java/util/Collection.java",
        "package java.util;
public interface Collection<E> extends Iterable<E> {
    int size();
    boolean isEmpty();
    boolean contains(Object o);
    boolean add(E e);
    boolean remove(Object o);
    void clear();
}
",
    ),
    (
        "java/util/List.java",
        "package java.util;
public interface List<E> extends Collection<E> {
    E get(int index);
    E set(int index, E element);
    boolean add(E e);
    void add(int index, E element);
    E remove(int index);
    int indexOf(Object o);
}
",
    ),
    (
        "java/util/ArrayList.java",
        "package java.util;
public class ArrayList<E> implements List<E> {
    public ArrayList() {}
    public ArrayList(int initialCapacity) {}
    public E get(int index);
    public E set(int index, E element);
    public boolean add(E e);
    public void add(int index, E element);
    public E remove(int index);
    public int indexOf(Object o);
    public int size();
    public boolean isEmpty();
    public boolean contains(Object o);
    public boolean remove(Object o);
    public void clear();
}
",
    ),
    (
        "java/util/Map.java",
        "package java.util;
public interface Map<K, V> {
    V get(Object key);
    V put(K key, V value);
    V remove(Object key);
    boolean containsKey(Object key);
    int size();
}
",
    ),
    (
        "java/util/HashMap.java",
        "package java.util;
public class HashMap<K, V> implements Map<K, V> {
    public HashMap() {}
    public V get(Object key);
    public V put(K key, V value);
    public V remove(Object key);
    public boolean containsKey(Object key);
    public int size();
}
",
    ),
    (
        "java/util/concurrent/Future.java",
        "package java.util.concurrent;
public interface Future<V> {
    V get();
    boolean isDone();
    boolean cancel(boolean mayInterruptIfRunning);
}
",
    ),
];
